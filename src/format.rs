pub const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.1}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

pub fn format_minutes(minutes: f64) -> String {
    let mins = minutes.max(0.0).round() as u64;
    if mins < 60 {
        return format!("{}m", mins);
    }
    let hours = mins / 60;
    let remain_mins = mins % 60;
    if hours < 24 {
        return format!("{}h {}m", hours, remain_mins);
    }
    format!("{}d {}h", hours / 24, hours % 24)
}

pub fn format_cost(cost: f64) -> String {
    if cost <= 0.0 {
        "$0.00".to_string()
    } else if cost < 0.01 {
        "<$0.01".to_string()
    } else {
        format!("${:.2}", cost)
    }
}

/// Cost with a marker when it was derived from the rate table.
pub fn format_cost_label(cost: f64, estimated: bool) -> String {
    if estimated {
        format!("~{}", format_cost(cost))
    } else {
        format_cost(cost)
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

pub fn short_model(model: &str) -> String {
    if model.is_empty() {
        return String::new();
    }
    // Match patterns like "claude-opus-4-6", "claude-sonnet-4-5-20250929"
    let m = model.to_lowercase();
    let families = ["opus", "sonnet", "haiku"];

    for family in families {
        if let Some(idx) = m.find(family) {
            let name = format!("{}{}", family[..1].to_uppercase(), &family[1..]);
            let rest = &m[idx + family.len()..];
            let parts: Vec<&str> = rest
                .split(|c: char| c == '-' || c == '_')
                .filter(|s| !s.is_empty())
                .collect();

            if parts.is_empty() {
                return name;
            }

            if parts[0].parse::<u32>().is_ok() {
                if parts.len() >= 2 && parts[1].parse::<u32>().is_ok() {
                    // Skip if it looks like a date (8+ digits)
                    if parts[1].len() >= 8 {
                        return format!("{} {}", name, parts[0]);
                    }
                    return format!("{} {}.{}", name, parts[0], parts[1]);
                }
                return format!("{} {}", name, parts[0]);
            }

            return name;
        }
    }

    // Not a Claude family name; show it as-is.
    model.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_500), "1.5K");
        assert_eq!(format_number(2_000_000), "2.0M");
        assert_eq!(format_number(3_200_000_000), "3.2B");
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0.0), "0m");
        assert_eq!(format_minutes(59.4), "59m");
        assert_eq!(format_minutes(125.0), "2h 5m");
        assert_eq!(format_minutes(60.0 * 26.0), "1d 2h");
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(0.0), "$0.00");
        assert_eq!(format_cost(0.004), "<$0.01");
        assert_eq!(format_cost(12.345), "$12.35");
        assert_eq!(format_cost_label(3.0, true), "~$3.00");
    }

    #[test]
    fn test_short_model() {
        assert_eq!(short_model("claude-sonnet-4-5-20250929"), "Sonnet 4.5");
        assert_eq!(short_model("claude-opus-4-20250514"), "Opus 4");
        assert_eq!(short_model("claude-3-haiku"), "Haiku");
        assert_eq!(short_model("gpt-5"), "gpt-5");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("héllo wörld", 5), "héllo...");
        assert_eq!(truncate("short", 10), "short");
    }
}
