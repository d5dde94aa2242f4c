//! ISO 3166-1 alpha-2 country code to English display name.
//!
//! Used when forwarding signups to the subscription API so the upstream
//! audience segments read as names instead of codes.

/// Display name for a country code; unknown or absent codes resolve to
/// `"Unknown"`.
pub fn country_name(country: Option<&str>) -> &'static str {
    match country {
        Some("AR") => "Argentina",
        Some("AT") => "Austria",
        Some("AU") => "Australia",
        Some("BE") => "Belgium",
        Some("BG") => "Bulgaria",
        Some("BR") => "Brazil",
        Some("CA") => "Canada",
        Some("CH") => "Switzerland",
        Some("CL") => "Chile",
        Some("CN") => "China",
        Some("CO") => "Colombia",
        Some("CZ") => "Czechia",
        Some("DE") => "Germany",
        Some("DK") => "Denmark",
        Some("EE") => "Estonia",
        Some("EG") => "Egypt",
        Some("ES") => "Spain",
        Some("FI") => "Finland",
        Some("FR") => "France",
        Some("GB") => "United Kingdom of Great Britain and Northern Ireland",
        Some("GR") => "Greece",
        Some("HK") => "Hong Kong",
        Some("HR") => "Croatia",
        Some("HU") => "Hungary",
        Some("ID") => "Indonesia",
        Some("IE") => "Ireland",
        Some("IL") => "Israel",
        Some("IN") => "India",
        Some("IS") => "Iceland",
        Some("IT") => "Italy",
        Some("JP") => "Japan",
        Some("KR") => "Republic of Korea",
        Some("LT") => "Lithuania",
        Some("LU") => "Luxembourg",
        Some("LV") => "Latvia",
        Some("MX") => "Mexico",
        Some("MY") => "Malaysia",
        Some("NL") => "Netherlands",
        Some("NO") => "Norway",
        Some("NZ") => "New Zealand",
        Some("PE") => "Peru",
        Some("PH") => "Philippines",
        Some("PL") => "Poland",
        Some("PT") => "Portugal",
        Some("RO") => "Romania",
        Some("RS") => "Serbia",
        Some("RU") => "Russian Federation",
        Some("SA") => "Saudi Arabia",
        Some("SE") => "Sweden",
        Some("SG") => "Singapore",
        Some("SI") => "Slovenia",
        Some("SK") => "Slovakia",
        Some("TH") => "Thailand",
        Some("TR") => "Turkey",
        Some("TW") => "Taiwan",
        Some("UA") => "Ukraine",
        Some("US") => "United States of America",
        Some("UY") => "Uruguay",
        Some("VN") => "Viet Nam",
        Some("ZA") => "South Africa",
        _ => "Unknown",
    }
}
