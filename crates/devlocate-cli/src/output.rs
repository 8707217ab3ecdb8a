//! Output formatting for query results.
//!
//! Every renderer writes to an `impl Write` so commands can target stdout
//! and tests can target a buffer.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use devlocate_lib::{NearbyUsers, RouteResult, User};

use crate::terminal::ColorPalette;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON matching the HTTP API bodies.
    Json,
}

/// Listing printed by the `users` command.
#[derive(Debug, Serialize)]
pub struct UserListing<'a> {
    pub count: usize,
    pub users: &'a [User],
}

/// Render a nearby query result.
pub fn render_nearby<W: Write>(
    out: &mut W,
    nearby: &NearbyUsers,
    format: OutputFormat,
    palette: ColorPalette,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, nearby),
        OutputFormat::Text => {
            let p = palette;
            writeln!(
                out,
                "Nearest {} user(s) to {}:",
                nearby.count, nearby.current_location
            )?;
            for (rank, ranked) in nearby.users.iter().enumerate() {
                let user = &ranked.user;
                writeln!(
                    out,
                    "{:>3}. {}{}{} (#{}) {}{:.2} km{} {}({}, {}){}",
                    rank + 1,
                    p.white_bold,
                    user.username,
                    p.reset,
                    user.id,
                    p.cyan,
                    ranked.distance_km,
                    p.reset,
                    p.gray,
                    user.latitude,
                    user.longitude,
                    p.reset,
                )?;
            }
            Ok(())
        }
    }
}

/// Render a normalized route.
pub fn render_route<W: Write>(
    out: &mut W,
    route: &RouteResult,
    format: OutputFormat,
    palette: ColorPalette,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, route),
        OutputFormat::Text => {
            let p = palette;
            writeln!(
                out,
                "Route ({}, {}) -> ({}, {})",
                route.origin.lat, route.origin.lon, route.destination.lat, route.destination.lon
            )?;
            writeln!(out, "  Distance: {}{:.2} km{}", p.cyan, route.distance_km, p.reset)?;
            writeln!(
                out,
                "  Duration: {}{} min{}",
                p.green, route.duration_minutes, p.reset
            )?;
            let points = route
                .geometry
                .get("coordinates")
                .and_then(|c| c.as_array())
                .map_or(0, Vec::len);
            writeln!(out, "  {}Geometry: {} point(s){}", p.gray, points, p.reset)
        }
    }
}

/// Render the full user list.
pub fn render_users<W: Write>(
    out: &mut W,
    users: &[User],
    format: OutputFormat,
    palette: ColorPalette,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(
            out,
            &UserListing {
                count: users.len(),
                users,
            },
        ),
        OutputFormat::Text => {
            let p = palette;
            writeln!(out, "{} user(s):", users.len())?;
            for user in users {
                writeln!(
                    out,
                    "  #{:<3} {}{}{} {}({}, {}){}",
                    user.id,
                    p.white_bold,
                    user.username,
                    p.reset,
                    p.gray,
                    user.latitude,
                    user.longitude,
                    p.reset,
                )?;
            }
            Ok(())
        }
    }
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use devlocate_lib::{nearby_users, Coordinate, LatLon, UserStore};
    use serde_json::{json, Value};

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn nyc_nearby(k: i64) -> NearbyUsers {
        nearby_users(&UserStore::builtin(), Coordinate::new(40.7128, -74.0060), k).unwrap()
    }

    fn sample_route() -> RouteResult {
        RouteResult {
            origin: LatLon {
                lat: 40.7128,
                lon: -74.006,
            },
            destination: LatLon {
                lat: 40.7614,
                lon: -73.9776,
            },
            distance_km: 8.42,
            duration_minutes: 17,
            geometry: json!({"type": "LineString", "coordinates": [[-74.006, 40.7128], [-73.9776, 40.7614]]}),
        }
    }

    #[test]
    fn nearby_text_lists_ranked_users() {
        let text = render(|out| {
            render_nearby(out, &nyc_nearby(2), OutputFormat::Text, ColorPalette::plain())
        });

        assert!(text.starts_with("Nearest 2 user(s) to (40.7128, -74.006):"));
        assert!(text.contains("1. Alice Johnson (#1) 0.00 km"));
        assert!(text.contains("2. Frank Miller (#6) 1.72 km"));
    }

    #[test]
    fn nearby_json_matches_api_shape() {
        let text = render(|out| {
            render_nearby(out, &nyc_nearby(1), OutputFormat::Json, ColorPalette::plain())
        });
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["count"], 1);
        assert_eq!(value["users"][0]["username"], "Alice Johnson");
        assert_eq!(value["current_location"]["latitude"], 40.7128);
    }

    #[test]
    fn route_text_summarizes() {
        let text = render(|out| {
            render_route(out, &sample_route(), OutputFormat::Text, ColorPalette::plain())
        });

        assert!(text.contains("Distance: 8.42 km"));
        assert!(text.contains("Duration: 17 min"));
        assert!(text.contains("Geometry: 2 point(s)"));
    }

    #[test]
    fn users_json_has_count() {
        let store = UserStore::builtin();
        let text = render(|out| {
            render_users(out, store.all(), OutputFormat::Json, ColorPalette::plain())
        });
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["count"], 15);
        assert_eq!(value["users"].as_array().unwrap().len(), 15);
    }

    #[test]
    fn colored_text_wraps_names() {
        let text = render(|out| {
            render_nearby(out, &nyc_nearby(1), OutputFormat::Text, ColorPalette::colored())
        });
        assert!(text.contains("\x1b[1;97mAlice Johnson\x1b[0m"));
    }
}
