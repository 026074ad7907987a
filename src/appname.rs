//! Best-effort resolution of a human-readable app name from a package id.

/// Exact package-id matches checked first.
const KNOWN_PACKAGES: &[(&str, &str)] = &[
    ("com.google.android.youtube", "YouTube"),
    ("com.android.chrome", "Chrome"),
    ("com.netflix.mediaclient", "Netflix"),
    ("com.spotify.music", "Spotify"),
    ("com.instagram.android", "Instagram"),
    ("com.zhiliaoapp.musically", "TikTok"),
    ("com.facebook.katana", "Facebook"),
    ("com.whatsapp", "WhatsApp"),
    ("com.twitter.android", "X"),
    ("com.mojang.minecraftpe", "Minecraft"),
    ("com.tencent.ig", "PUBG Mobile"),
    ("com.activision.callofduty.shooter", "Call of Duty Mobile"),
    ("com.miHoYo.GenshinImpact", "Genshin Impact"),
    ("com.supercell.clashofclans", "Clash of Clans"),
    ("com.roblox.client", "Roblox"),
    ("com.epicgames.fortnite", "Fortnite"),
];

/// Ordered substring heuristics, applied after the exact table misses.
const SUBSTRING_HINTS: &[(&str, &str)] = &[
    ("netflix", "Netflix"),
    ("youtube", "YouTube"),
    ("spotify", "Spotify"),
    ("instagram", "Instagram"),
    ("tiktok", "TikTok"),
    ("musically", "TikTok"),
    ("minecraft", "Minecraft"),
    ("genshin", "Genshin Impact"),
    ("pubg", "PUBG Mobile"),
    ("fortnite", "Fortnite"),
    ("roblox", "Roblox"),
    ("chrome", "Chrome"),
];

pub const UNKNOWN_APP: &str = "Unknown App";

/// Resolve the final app name for a session.
///
/// Preference order: caller-supplied override, then the CSV-supplied name,
/// then the name embedded in the device-info blob, then
/// [`app_name_from_package`]. CSV/JSON names equal to `"Unknown App"` are
/// treated as absent.
pub fn resolve_app_name(
    user_override: Option<&str>,
    csv_name: Option<&str>,
    json_name: Option<&str>,
    package: &str,
) -> String {
    if let Some(name) = user_override
        && !name.trim().is_empty()
    {
        return name.trim().to_string();
    }
    for candidate in [csv_name, json_name] {
        if let Some(name) = candidate {
            let name = name.trim();
            if !name.is_empty() && name != UNKNOWN_APP {
                return name.to_string();
            }
        }
    }
    app_name_from_package(package)
}

/// Derive an app name from a package identifier alone: exact table, then
/// substring heuristics, then title-casing the last dot segment.
pub fn app_name_from_package(package: &str) -> String {
    let package = package.trim();
    if package.is_empty() {
        return UNKNOWN_APP.to_string();
    }

    if let Some((_, name)) = KNOWN_PACKAGES.iter().find(|(pkg, _)| *pkg == package) {
        return (*name).to_string();
    }

    let lower = package.to_ascii_lowercase();
    if let Some((_, name)) = SUBSTRING_HINTS.iter().find(|(hint, _)| lower.contains(hint)) {
        return (*name).to_string();
    }

    match package.rsplit('.').next() {
        Some(segment) if !segment.is_empty() => title_case(segment),
        _ => UNKNOWN_APP.to_string(),
    }
}

fn title_case(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => UNKNOWN_APP.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_everything() {
        let name = resolve_app_name(
            Some("My Build"),
            Some("Netflix"),
            Some("Other"),
            "com.netflix.mediaclient",
        );
        assert_eq!(name, "My Build");
    }

    #[test]
    fn unknown_app_marker_is_treated_as_absent() {
        let name = resolve_app_name(None, Some(UNKNOWN_APP), None, "com.netflix.mediaclient");
        assert_eq!(name, "Netflix");
    }

    #[test]
    fn json_name_used_when_csv_empty() {
        let name = resolve_app_name(None, Some(""), Some("Cool Game"), "com.example.coolgame");
        assert_eq!(name, "Cool Game");
    }

    #[test]
    fn exact_table_then_substring_then_title_case() {
        assert_eq!(app_name_from_package("com.google.android.youtube"), "YouTube");
        assert_eq!(app_name_from_package("com.netflix.ninja"), "Netflix");
        assert_eq!(app_name_from_package("org.example.launcher"), "Launcher");
    }

    #[test]
    fn empty_package_falls_back_to_unknown() {
        assert_eq!(app_name_from_package(""), UNKNOWN_APP);
        assert_eq!(resolve_app_name(None, None, None, "  "), UNKNOWN_APP);
    }
}
