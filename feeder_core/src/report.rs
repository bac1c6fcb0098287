//! Structured status screens for display front ends.

/// Feeding status report. With `large` set, only up to 10 characters
/// of `detail1` are meaningful and `detail2` is unused, so a front end
/// can render the text at double scale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateReport {
    pub header: String,
    pub detail1: String,
    pub detail2: String,
    pub large: bool,
}

/// Ten-cell feed progress bar, `n` cells filled.
pub(crate) fn progress_bar(n: usize) -> String {
    let mut bar = String::with_capacity(10);
    for i in 0..10 {
        bar.push(if i < n { '#' } else { '-' });
    }
    bar
}

/// One line of weight statistics, fixed width for a 20-column display.
pub(crate) fn weight_line(mean_g: f32, stddev_g: f32) -> String {
    format!("{mean_g:+7.1}g +/-{stddev_g:6.1}g")
}

/// Remaining cooldown as m:ss.
pub(crate) fn countdown(remain_ms: u64) -> String {
    let seconds = remain_ms / 1000;
    let minutes = seconds / 60;
    format!("{}:{:02}", minutes, seconds - minutes * 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_fills_left_to_right() {
        assert_eq!(progress_bar(0), "----------");
        assert_eq!(progress_bar(3), "###-------");
        assert_eq!(progress_bar(10), "##########");
    }

    #[test]
    fn weight_line_is_fixed_width() {
        assert_eq!(weight_line(1450.0, 0.4), "+1450.0g +/-   0.4g");
        assert_eq!(weight_line(-3.2, 12.0), "   -3.2g +/-  12.0g");
    }

    #[test]
    fn countdown_formats_minutes_and_seconds() {
        assert_eq!(countdown(299_000), "4:59");
        assert_eq!(countdown(61_000), "1:01");
        assert_eq!(countdown(999), "0:00");
    }
}
