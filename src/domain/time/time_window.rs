use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// Window used when the expression carries no recognizable duration.
pub const DEFAULT_WINDOW_MINUTES: i64 = 15;

/// `<integer><optional whitespace><unit>`; unit tokens in English and Chinese.
static DURATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([0-9]+)\s*(min|m|分钟|hour|h|小时|day|d|天)")
        .expect("duration pattern is a valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "m" | "min" | "分钟" => Some(TimeUnit::Minutes),
            "h" | "hour" | "小时" => Some(TimeUnit::Hours),
            "d" | "day" | "天" => Some(TimeUnit::Days),
            _ => None,
        }
    }

    fn duration(&self, magnitude: i64) -> Option<Duration> {
        match self {
            TimeUnit::Minutes => Duration::try_minutes(magnitude),
            TimeUnit::Hours => Duration::try_hours(magnitude),
            TimeUnit::Days => Duration::try_days(magnitude),
        }
    }
}

/// A trailing window `[start, end)` where `end` is the resolution instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTimeWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub timezone: Tz,
}

impl ResolvedTimeWindow {
    pub fn span(&self) -> Duration {
        self.end.signed_duration_since(self.start)
    }

    /// Human-readable `"YYYY-MM-DD HH:MM 到 YYYY-MM-DD HH:MM"` in the window's zone.
    pub fn describe(&self) -> String {
        format!(
            "{} 到 {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Look up an IANA zone name, degrading to UTC for unknown identifiers.
pub fn resolve_timezone(name: &str) -> Tz {
    match name.trim().parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            warn!("⚠️ Unknown timezone {:?}, falling back to UTC", name);
            Tz::UTC
        }
    }
}

/// Resolve a free-text duration expression into a window ending now.
pub fn resolve(expression: &str, timezone: &str) -> ResolvedTimeWindow {
    resolve_at(expression, timezone, Utc::now())
}

/// Same as [`resolve`] with an explicit resolution instant.
pub fn resolve_at(expression: &str, timezone: &str, now: DateTime<Utc>) -> ResolvedTimeWindow {
    let tz = resolve_timezone(timezone);
    let span = parse_span(expression).unwrap_or_else(|| {
        debug!(
            "No duration in {:?}, using default {}m window",
            expression, DEFAULT_WINDOW_MINUTES
        );
        Duration::minutes(DEFAULT_WINDOW_MINUTES)
    });

    // Oversized windows are honored up to the earliest representable instant.
    let start = now.checked_sub_signed(span).unwrap_or(DateTime::<Utc>::MIN_UTC);

    ResolvedTimeWindow {
        start: start.with_timezone(&tz),
        end: now.with_timezone(&tz),
        timezone: tz,
    }
}

/// First `<magnitude><unit>` match as a duration; `None` when absent or zero.
fn parse_span(expression: &str) -> Option<Duration> {
    let caps = DURATION_PATTERN.captures(expression)?;
    let unit = TimeUnit::from_token(caps.get(2)?.as_str())?;

    let magnitude = match caps.get(1)?.as_str().parse::<i64>() {
        Ok(0) => return None,
        Ok(n) => n,
        // Does not fit in i64: the largest honored span.
        Err(_) => return Some(Duration::MAX),
    };

    Some(unit.duration(magnitude).unwrap_or(Duration::MAX))
}
