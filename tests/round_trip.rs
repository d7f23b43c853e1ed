use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde::{Deserialize, Serialize};
use serde_urlform::{
    from_str, from_str_with_options, percent_decode, percent_encode, to_string,
    to_string_with_options, DateStrategy, DecodeOptions, EncodeOptions, Error, KeyMapping, Node,
    SpaceEncoding, Timestamp,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    display_name: String,
    age: u32,
    score: f64,
    active: bool,
    nickname: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    settings: Settings,
    links: Vec<Link>,
    extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Settings {
    dark_mode: bool,
    font_size: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Link {
    rel: String,
    href: String,
}

fn profile() -> Profile {
    Profile {
        display_name: "Grace & co = 100% \u{1F680}".to_string(),
        age: 85,
        score: -12.75,
        active: true,
        nickname: None,
        tags: vec!["navy".to_string(), "cobol".to_string()],
        settings: Settings {
            dark_mode: false,
            font_size: 14,
        },
        links: vec![
            Link {
                rel: "home".to_string(),
                href: "https://example.com/?a=1&b=2".to_string(),
            },
            Link {
                rel: "blog".to_string(),
                href: "https://example.com/blog".to_string(),
            },
        ],
        extra: BTreeMap::from([
            ("first key".to_string(), "v1".to_string()),
            ("second+key".to_string(), String::new()),
        ]),
    }
}

#[rstest]
#[case::defaults(EncodeOptions::default(), DecodeOptions::default())]
#[case::snake_case(
    EncodeOptions::new().with_key_mapping(KeyMapping::SnakeCase),
    DecodeOptions::new().with_key_mapping(KeyMapping::SnakeCase)
)]
#[case::plus_spaces_sorted(
    EncodeOptions::new()
        .with_space_encoding(SpaceEncoding::PlusReplaced)
        .with_alphabetize_keys(true),
    DecodeOptions::default()
)]
fn struct_round_trips(#[case] encode: EncodeOptions, #[case] decode: DecodeOptions) {
    let value = profile();
    let wire = to_string_with_options(&value, &encode).unwrap();
    let back: Profile = from_str_with_options(&wire, &decode).unwrap();
    assert_eq!(back, value);
}

#[rstest]
fn empty_vectors_need_a_default() {
    let mut value = profile();
    value.tags.clear();
    let wire = to_string(&value).unwrap();
    assert!(!wire.contains("tags"));
    assert_eq!(from_str::<Profile>(&wire).unwrap(), value);
}

#[rstest]
fn custom_key_mapping_round_trips() {
    let mapping = KeyMapping::custom(
        |key| format!("p_{key}"),
        |key| key.strip_prefix("p_").unwrap_or(key).to_string(),
    );
    let value = Settings {
        dark_mode: true,
        font_size: 9,
    };
    let wire =
        to_string_with_options(&value, &EncodeOptions::new().with_key_mapping(mapping.clone()))
            .unwrap();
    assert_eq!(wire, "p_darkMode=true&p_fontSize=9");
    let back: Settings =
        from_str_with_options(&wire, &DecodeOptions::new().with_key_mapping(mapping)).unwrap();
    assert_eq!(back, value);
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Event {
    name: String,
    at: Timestamp,
    until: Option<Timestamp>,
}

fn event() -> Event {
    Event {
        name: "launch".to_string(),
        at: Timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
        until: None,
    }
}

#[rstest]
#[case::deferred(DateStrategy::Deferred, "2024-03-01T12%3A00%3A00Z")]
#[case::seconds(DateStrategy::SecondsSince1970, "1709294400")]
#[case::millis(DateStrategy::MillisecondsSince1970, "1709294400000")]
#[case::iso(DateStrategy::Iso8601, "2024-03-01T12%3A00%3A00Z")]
#[case::formatted(DateStrategy::formatted("%Y-%m-%d %H:%M"), "2024-03-01%2012%3A00")]
fn dates_follow_the_strategy(#[case] strategy: DateStrategy, #[case] rendered: &str) {
    let encode = EncodeOptions::new().with_date_strategy(strategy.clone());
    let wire = to_string_with_options(&event(), &encode).unwrap();
    assert_eq!(wire, format!("name=launch&at={rendered}&until"));

    let decode = DecodeOptions::new().with_date_strategy(strategy);
    let back: Event = from_str_with_options(&wire, &decode).unwrap();
    assert_eq!(back, event());
}

#[rstest]
#[case::millis(DateStrategy::MillisecondsSince1970, "1709294400123")]
#[case::seconds(DateStrategy::SecondsSince1970, "1709294400.123")]
fn epoch_dates_keep_milliseconds(#[case] strategy: DateStrategy, #[case] rendered: &str) {
    let value = Event {
        at: Timestamp(Utc.timestamp_millis_opt(1_709_294_400_123).unwrap()),
        ..event()
    };
    let encode = EncodeOptions::new().with_date_strategy(strategy.clone());
    let wire = to_string_with_options(&value, &encode).unwrap();
    assert_eq!(wire, format!("name=launch&at={rendered}&until"));

    let decode = DecodeOptions::new().with_date_strategy(strategy);
    let back: Event = from_str_with_options(&wire, &decode).unwrap();
    assert_eq!(back, value);
}

#[rstest]
fn custom_date_strategy_controls_the_node() {
    let strategy = DateStrategy::custom(
        |date| {
            Ok([
                ("day", Node::leaf(date.format("%Y-%m-%d").to_string())),
                ("hour", Node::leaf(date.format("%H").to_string())),
            ]
            .into_iter()
            .collect())
        },
        |node| {
            let day = node.get("day").and_then(Node::as_str).unwrap_or_default();
            let hour = node.get("hour").and_then(Node::as_str).unwrap_or_default();
            chrono::NaiveDateTime::parse_from_str(&format!("{day} {hour}"), "%Y-%m-%d %H")
                .map(|naive| naive.and_utc())
                .map_err(|_| Error::Message(format!("bad custom date {day} {hour}")))
        },
    );
    let wire = to_string_with_options(
        &event(),
        &EncodeOptions::new().with_date_strategy(strategy.clone()),
    )
    .unwrap();
    assert_eq!(wire, "name=launch&at[day]=2024-03-01&at[hour]=12&until");

    let back: Event =
        from_str_with_options(&wire, &DecodeOptions::new().with_date_strategy(strategy)).unwrap();
    assert_eq!(back, event());
}

#[rstest]
#[case("plain")]
#[case("spaces and + plus")]
#[case("a&b=c%d")]
#[case("ünïcødé \u{1F600}")]
#[case("[brackets]")]
fn percent_helpers_round_trip(#[case] text: &str) {
    let encoded = percent_encode(text);
    assert!(!encoded.contains(['&', '=', ' ', '+', '[']));
    assert_eq!(percent_decode(&encoded).unwrap(), text);
}
