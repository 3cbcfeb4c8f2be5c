//! Depth legend shown in the bottom-right corner of the map.
//!
//! Rows read shallow to deep, the reverse of how [`crate::style::circle_color`]
//! evaluates its steps.

use std::fmt::Write;

/// Legend header markup.
pub const LEGEND_HEADER: &str = "<h3>Earthquake Depth (km)</h3><hr>";

/// One legend row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendEntry {
    /// HTML-formatted band label
    pub label: &'static str,
    /// Band color (hex)
    pub color: &'static str,
}

/// Legend rows, shallow to deep.
pub const LEGEND_ENTRIES: [LegendEntry; 6] = [
    LegendEntry {
        label: "<b>Less than 10</b>",
        color: "#1a9850",
    },
    LegendEntry {
        label: "<b>10 to 30</b>",
        color: "#91cf60",
    },
    LegendEntry {
        label: "<b>30 to 50</b>",
        color: "#d9ef8b",
    },
    LegendEntry {
        label: "<b>50 to 70</b>",
        color: "#fee08b",
    },
    LegendEntry {
        label: "<b>70 to 90</b>",
        color: "#fc8d59",
    },
    LegendEntry {
        label: "<b>More than 90</b>",
        color: "#d73027",
    },
];

/// Render the legend as a static markup fragment.
#[must_use]
pub fn legend_html() -> String {
    let mut html = String::from(LEGEND_HEADER);
    for entry in &LEGEND_ENTRIES {
        // Writing to a String cannot fail
        let _ = write!(
            html,
            "<p style = \"background-color: {}\">{}</p> ",
            entry.color, entry.label
        );
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::circle_color;

    #[test]
    fn test_legend_rows_in_order() {
        let html = legend_html();
        assert!(html.starts_with(LEGEND_HEADER));
        assert_eq!(html.matches("<p style").count(), 6);

        let mut last = 0;
        for entry in &LEGEND_ENTRIES {
            let row = format!(
                "<p style = \"background-color: {}\">{}</p>",
                entry.color, entry.label
            );
            let pos = html.find(&row).expect("row missing");
            assert!(pos >= last, "row out of order: {}", entry.label);
            last = pos;
        }
    }

    #[test]
    fn test_legend_is_idempotent() {
        assert_eq!(legend_html(), legend_html());
    }

    #[test]
    fn test_legend_colors_match_styling() {
        let samples = [5.0, 20.0, 40.0, 60.0, 80.0, 100.0];
        for (entry, depth) in LEGEND_ENTRIES.iter().zip(samples) {
            assert_eq!(entry.color, circle_color(depth));
        }
    }
}
