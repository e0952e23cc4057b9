use chrono::{DateTime, Local};

use crate::Route;

pub const ETA_UNKNOWN: &str = "ETA unknown";

const ARRIVED_FORMAT: &str = "%d %b %Y at %H:%M:%S";

/// Human readable arrival text for `route`, relative to `now`.
///
/// A route with no travel time is shown as the current time.
pub fn describe(route: Option<&Route>, now: DateTime<Local>) -> String {
    let Some(route) = route else {
        return ETA_UNKNOWN.to_owned();
    };
    let minutes = route.travel_time.as_secs() / 60;
    if route.travel_time.is_zero() {
        now.format(ARRIVED_FORMAT).to_string()
    } else {
        format!(
            "{:.0}mts and {}min away",
            route.distance_meters, minutes
        )
    }
}
