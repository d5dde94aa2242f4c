//! ISO 3166-1 alpha-2 country code to ISO 4217 currency code.
//!
//! Countries missing from the table resolve to `None`; the whoami handler
//! serializes that as an explicit JSON `null`.

/// Currency code for a country, if known.
pub fn country_currency(country: &str) -> Option<&'static str> {
    let currency = match country {
        // Eurozone and euro-pegged territories
        "AD" | "AT" | "AX" | "BE" | "BL" | "CY" | "DE" | "EE" | "ES" | "FI" | "FR" | "GF"
        | "GP" | "GR" | "HR" | "IE" | "IT" | "LT" | "LU" | "LV" | "MC" | "ME" | "MF" | "MQ"
        | "MT" | "NL" | "PM" | "PT" | "RE" | "SI" | "SK" | "SM" | "TF" | "VA" | "XK" | "YT" => {
            "EUR"
        }

        // US dollar, including territories and dollarized economies
        "AS" | "BQ" | "EC" | "FM" | "GU" | "IO" | "MH" | "MP" | "PR" | "PW" | "SV" | "TC"
        | "TL" | "UM" | "US" | "VG" | "VI" => "USD",

        // Sterling
        "GB" | "GG" | "GS" | "IM" | "JE" => "GBP",

        // Australian dollar
        "AU" | "CC" | "CX" | "HM" | "KI" | "NF" | "NR" | "TV" => "AUD",

        // New Zealand dollar
        "CK" | "NU" | "NZ" | "PN" | "TK" => "NZD",

        // Norwegian krone
        "BV" | "NO" | "SJ" => "NOK",

        // Danish krone
        "DK" | "FO" | "GL" => "DKK",

        // CFA franc (west and central)
        "BF" | "BJ" | "CI" | "GW" | "ML" | "NE" | "SN" | "TG" => "XOF",
        "CF" | "CG" | "CM" | "GA" | "GQ" | "TD" => "XAF",

        // East Caribbean dollar
        "AG" | "AI" | "DM" | "GD" | "KN" | "LC" | "MS" | "VC" => "XCD",

        // Swiss franc
        "CH" | "LI" => "CHF",

        // South African rand
        "LS" | "NA" | "ZA" => "ZAR",

        // CFP franc
        "NC" | "PF" | "WF" => "XPF",

        "AE" => "AED",
        "AF" => "AFN",
        "AL" => "ALL",
        "AM" => "AMD",
        "AO" => "AOA",
        "AR" => "ARS",
        "AW" => "AWG",
        "AZ" => "AZN",
        "BA" => "BAM",
        "BB" => "BBD",
        "BD" => "BDT",
        "BG" => "BGN",
        "BH" => "BHD",
        "BI" => "BIF",
        "BM" => "BMD",
        "BN" => "BND",
        "BO" => "BOB",
        "BR" => "BRL",
        "BS" => "BSD",
        "BT" => "BTN",
        "BW" => "BWP",
        "BY" => "BYN",
        "BZ" => "BZD",
        "CA" => "CAD",
        "CD" => "CDF",
        "CL" => "CLP",
        "CN" => "CNY",
        "CO" => "COP",
        "CR" => "CRC",
        "CU" => "CUP",
        "CV" => "CVE",
        "CW" => "ANG",
        "CZ" => "CZK",
        "DJ" => "DJF",
        "DO" => "DOP",
        "DZ" => "DZD",
        "EG" => "EGP",
        "ER" => "ERN",
        "ET" => "ETB",
        "FJ" => "FJD",
        "FK" => "FKP",
        "GE" => "GEL",
        "GH" => "GHS",
        "GI" => "GIP",
        "GM" => "GMD",
        "GN" => "GNF",
        "GT" => "GTQ",
        "GY" => "GYD",
        "HK" => "HKD",
        "HN" => "HNL",
        "HT" => "HTG",
        "HU" => "HUF",
        "ID" => "IDR",
        "IL" => "ILS",
        "IN" => "INR",
        "IQ" => "IQD",
        "IR" => "IRR",
        "IS" => "ISK",
        "JM" => "JMD",
        "JO" => "JOD",
        "JP" => "JPY",
        "KE" => "KES",
        "KG" => "KGS",
        "KH" => "KHR",
        "KM" => "KMF",
        "KP" => "KPW",
        "KR" => "KRW",
        "KW" => "KWD",
        "KY" => "KYD",
        "KZ" => "KZT",
        "LA" => "LAK",
        "LB" => "LBP",
        "LK" => "LKR",
        "LR" => "LRD",
        "LY" => "LYD",
        "MA" | "EH" => "MAD",
        "MD" => "MDL",
        "MG" => "MGA",
        "MK" => "MKD",
        "MM" => "MMK",
        "MN" => "MNT",
        "MO" => "MOP",
        "MR" => "MRU",
        "MU" => "MUR",
        "MV" => "MVR",
        "MW" => "MWK",
        "MX" => "MXN",
        "MY" => "MYR",
        "MZ" => "MZN",
        "NG" => "NGN",
        "NI" => "NIO",
        "NP" => "NPR",
        "OM" => "OMR",
        "PA" => "PAB",
        "PE" => "PEN",
        "PG" => "PGK",
        "PH" => "PHP",
        "PK" => "PKR",
        "PL" => "PLN",
        "PY" => "PYG",
        "QA" => "QAR",
        "RO" => "RON",
        "RS" => "RSD",
        "RU" => "RUB",
        "RW" => "RWF",
        "SA" => "SAR",
        "SB" => "SBD",
        "SC" => "SCR",
        "SD" => "SDG",
        "SE" => "SEK",
        "SG" => "SGD",
        "SH" => "SHP",
        "SL" => "SLE",
        "SO" => "SOS",
        "SR" => "SRD",
        "SS" => "SSP",
        "ST" => "STN",
        "SX" => "ANG",
        "SY" => "SYP",
        "SZ" => "SZL",
        "TH" => "THB",
        "TJ" => "TJS",
        "TM" => "TMT",
        "TN" => "TND",
        "TO" => "TOP",
        "TR" => "TRY",
        "TT" => "TTD",
        "TW" => "TWD",
        "TZ" => "TZS",
        "UA" => "UAH",
        "UG" => "UGX",
        "UY" => "UYU",
        "UZ" => "UZS",
        "VE" => "VES",
        "VN" => "VND",
        "VU" => "VUV",
        "WS" => "WST",
        "YE" => "YER",
        "ZM" => "ZMW",
        "ZW" => "ZWL",
        _ => return None,
    };
    Some(currency)
}
