use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Diet code to the category name shown in the chart.
    static ref DIET_LABELS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("meat100", "High meat-eaters");
        m.insert("meat", "Medium meat-eaters");
        m.insert("meat50", "Low meat-eaters");
        m.insert("fish", "Fish-eaters");
        m.insert("veggie", "Vegetarians");
        m.insert("vegan", "Vegans");
        m
    };
}

/// Every diet code with a display label
pub const DIET_CODES: [&str; 6] = ["meat100", "meat", "meat50", "fish", "veggie", "vegan"];

/// Look up the display label for a diet code. Codes are matched exactly;
/// `None` means the code is unmapped and the chart falls back to a blank label.
pub fn diet_label(code: &str) -> Option<&'static str> {
    DIET_LABELS.get(code).copied()
}
