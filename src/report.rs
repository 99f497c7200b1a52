//! Quotation document: structured model separated from the text renderer.
//!
//! The report carries every input and derived value verbatim; it applies no
//! business logic of its own.

use std::fmt;

use chrono::NaiveDate;

use crate::costing::{CostBreakdown, format_naira};
use crate::load::ApplianceEntry;
use crate::session::ClientInfo;
use crate::sizing::{DesignParams, SizingResult};

pub const COMPANY: &str = "ANNUR TECH SOLAR SOLUTIONS";
pub const MOTTO: &str = "Illuminating Nigeria's Future";
pub const ADDRESS: &str = "No 6 Kolo Drive, Behind Zuma Barrack, Tafa LGA, Niger State, Nigeria";
pub const PHONE: &str = "+234 905 169 3000";
pub const EMAIL: &str = "albataskumyjr@gmail.com";
pub const WEBSITE: &str = "www.annurtech.ng";

const RULE_WIDTH: usize = 70;

/// Fully assembled quotation for one client.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteReport {
    pub client: ClientInfo,
    pub entries: Vec<ApplianceEntry>,
    pub params: DesignParams,
    pub sizing: SizingResult,
    pub costs: CostBreakdown,
    pub date: NaiveDate,
}

impl QuoteReport {
    /// Quote reference of the form `ANNUR-<YYYYMMDD>-001`.
    pub fn reference(&self) -> String {
        format!("ANNUR-{}-001", self.date.format("%Y%m%d"))
    }

    /// Download file name, `AnnurTech_Quotation_<ClientName>_<YYYYMMDD>.<ext>`,
    /// with spaces in the client name replaced by underscores.
    pub fn file_name(&self, ext: &str) -> String {
        format!(
            "AnnurTech_Quotation_{}_{}.{ext}",
            self.client.name.trim().replace(' ', "_"),
            self.date.format("%Y%m%d"),
        )
    }

    /// Renders the flat text document.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QuoteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        let minor_rule = "-".repeat(RULE_WIDTH);

        writeln!(f, "{rule}")?;
        writeln!(f, "{COMPANY}")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "{MOTTO}")?;
        writeln!(f)?;

        writeln!(f, "CLIENT INFORMATION")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Name: {}", self.client.name)?;
        writeln!(f, "Address: {}", self.client.address)?;
        writeln!(f, "Phone: {}", self.client.phone)?;
        let email = if self.client.email.is_empty() {
            "Not provided"
        } else {
            &self.client.email
        };
        writeln!(f, "Email: {email}")?;
        writeln!(f, "Location: {}", self.client.location)?;
        writeln!(f, "Date: {}", self.date.format("%Y-%m-%d"))?;
        writeln!(f, "Quote Reference: {}", self.reference())?;
        writeln!(f)?;

        writeln!(f, "LOAD AUDIT SUMMARY")?;
        writeln!(f, "{rule}")?;
        for entry in &self.entries {
            writeln!(
                f,
                "{} - {:.0}W x {} x {}h = {:.0} Wh/day",
                entry.name(),
                entry.unit_watt(),
                entry.quantity(),
                entry.hours_per_day(),
                entry.daily_energy_wh(),
            )?;
        }
        let total_wh: f64 = self.entries.iter().map(ApplianceEntry::daily_energy_wh).sum();
        let total_w: f64 = self.entries.iter().map(ApplianceEntry::total_watt).sum();
        writeln!(f)?;
        writeln!(f, "Total Energy Demand: {total_wh:.0} Wh/day")?;
        writeln!(f, "Total Power Demand: {total_w:.0} W")?;
        writeln!(f)?;

        writeln!(f, "SYSTEM SIZING")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Backup Time: {} hours", self.params.backup_hours)?;
        writeln!(f, "Battery Voltage: {}V", self.params.system_voltage)?;
        writeln!(f, "Depth of Discharge: {}%", self.params.dod_pct)?;
        writeln!(f, "Temperature Derating: {}%", self.params.derating_pct)?;
        writeln!(f)?;
        writeln!(f, "Battery Capacity: {:.0} Ah", self.sizing.battery_capacity_ah)?;
        writeln!(f, "Battery Type: {}", self.sizing.battery.name)?;
        writeln!(f, "Number of Batteries: {:.1}", self.sizing.battery_count)?;
        writeln!(f)?;
        writeln!(
            f,
            "Required Solar Capacity: {:.0} W",
            self.sizing.required_solar_w
        )?;
        writeln!(f, "Solar Panel Type: {}", self.sizing.panel.name)?;
        writeln!(f, "Number of Panels: {:.1}", self.sizing.panel_count)?;
        writeln!(f, "Sun Hours: {} hours/day", self.params.sun_hours)?;
        writeln!(f, "System Efficiency: {}%", self.params.efficiency_pct)?;
        writeln!(f)?;
        writeln!(
            f,
            "Charge Controller Size: {:.0} A",
            self.sizing.controller_current_a
        )?;
        writeln!(f, "Recommended Controller: {}", self.sizing.controller_name())?;
        writeln!(f)?;
        writeln!(f, "Inverter Size: {:.0} W", self.sizing.inverter_size_w)?;
        writeln!(f, "Recommended Inverter: {}", self.sizing.inverter_name())?;
        writeln!(f)?;

        writeln!(f, "COST BREAKDOWN")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Battery Cost: {}", format_naira(self.costs.battery_cost))?;
        writeln!(f, "Solar Panel Cost: {}", format_naira(self.costs.solar_cost))?;
        writeln!(f, "Inverter Cost: {}", format_naira(self.costs.inverter_cost))?;
        writeln!(
            f,
            "Charge Controller Cost: {}",
            format_naira(self.costs.controller_cost)
        )?;
        writeln!(
            f,
            "Installation Cost: {}",
            format_naira(self.costs.installation_cost)
        )?;
        writeln!(
            f,
            "Wiring & Accessories: {}",
            format_naira(self.costs.wiring_cost)
        )?;
        writeln!(f, "{minor_rule}")?;
        writeln!(f, "TOTAL SYSTEM COST: {}", format_naira(self.costs.total_cost))?;
        writeln!(f)?;

        writeln!(f, "FINANCIAL ANALYSIS")?;
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "Monthly Energy Consumption: {:.1} kWh",
            self.costs.monthly_energy_kwh
        )?;
        writeln!(
            f,
            "Monthly Savings: {}",
            format_naira(self.costs.monthly_savings)
        )?;
        writeln!(
            f,
            "Annual Savings: {}",
            format_naira(self.costs.annual_savings)
        )?;
        writeln!(f, "Payback Period: {:.1} years", self.costs.payback_years)?;
        writeln!(
            f,
            "ROI over {} years: {:.0}%",
            self.params.lifespan_years, self.costs.roi_pct
        )?;
        writeln!(f)?;

        writeln!(f, "TERMS & CONDITIONS")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Quote Validity: 30 days from date of issue")?;
        writeln!(
            f,
            "Warranty: Equipment as per manufacturer warranty + 1 year workmanship"
        )?;
        writeln!(f, "Payment Terms: 50% advance, 50% upon completion")?;
        writeln!(
            f,
            "Installation Timeline: 5-7 working days after material availability"
        )?;
        writeln!(f, "Service: 6 months free maintenance included")?;
        writeln!(f)?;
        writeln!(f, "{COMPANY} | {PHONE} | {EMAIL} | {WEBSITE}")?;
        writeln!(f, "{ADDRESS}")?;
        writeln!(f)?;
        write!(
            f,
            "Thank you for choosing Annur Tech - Powering Nigeria's Future!"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::session::Session;

    fn sample_quote() -> Option<QuoteReport> {
        let catalog = Catalog::builtin();
        let mut session = Session::new(&catalog);
        session.client = ClientInfo {
            name: "Amina Bello".into(),
            address: "12 Marina Road, Lagos".into(),
            phone: "08012345678".into(),
            email: String::new(),
            location: "Lagos".into(),
        };
        session.add_preset_load("Ceiling Fan", 2).ok()?;
        session.add_preset_load("Refrigerator (Medium)", 1).ok()?;
        let date = NaiveDate::from_ymd_opt(2025, 3, 14)?;
        session.quote(date).ok()
    }

    #[test]
    fn reference_embeds_the_quote_date() {
        let quote = sample_quote();
        assert_eq!(
            quote.as_ref().map(QuoteReport::reference),
            Some("ANNUR-20250314-001".to_string())
        );
    }

    #[test]
    fn file_name_replaces_spaces_with_underscores() {
        let quote = sample_quote();
        assert_eq!(
            quote.as_ref().map(|q| q.file_name("txt")),
            Some("AnnurTech_Quotation_Amina_Bello_20250314.txt".to_string())
        );
    }

    #[test]
    fn render_contains_every_section_in_order() {
        let Some(quote) = sample_quote() else {
            panic!("sample quote should build");
        };
        let text = quote.render();
        let sections = [
            COMPANY,
            "CLIENT INFORMATION",
            "LOAD AUDIT SUMMARY",
            "SYSTEM SIZING",
            "COST BREAKDOWN",
            "FINANCIAL ANALYSIS",
            "TERMS & CONDITIONS",
        ];
        let mut last = 0;
        for section in sections {
            match text[last..].find(section) {
                Some(pos) => last += pos,
                None => panic!("missing section {section:?}"),
            }
        }
    }

    #[test]
    fn render_reports_inputs_verbatim() {
        let Some(quote) = sample_quote() else {
            panic!("sample quote should build");
        };
        let text = quote.render();
        assert!(text.contains("Name: Amina Bello"));
        assert!(text.contains("Email: Not provided"));
        assert!(text.contains("Ceiling Fan - 75W x 2 x 8h = 1200 Wh/day"));
        // 150*8 + 1200
        assert!(text.contains("Total Energy Demand: 2400 Wh/day"));
        assert!(text.contains("Total Power Demand: 300 W"));
        assert!(text.contains("Quote Reference: ANNUR-20250314-001"));
    }

    #[test]
    fn render_carries_the_cost_lines() {
        let Some(quote) = sample_quote() else {
            panic!("sample quote should build");
        };
        let text = quote.render();
        for line in [
            "Battery Cost:",
            "Solar Panel Cost:",
            "Inverter Cost:",
            "Charge Controller Cost:",
            "Installation Cost:",
            "Wiring & Accessories:",
            "TOTAL SYSTEM COST:",
            "Payback Period:",
        ] {
            assert!(text.contains(line), "missing line {line:?}");
        }
    }
}
