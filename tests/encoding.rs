use std::collections::{BTreeMap, HashSet};

use rstest::rstest;
use serde::Serialize;
use serde_json::json;
use serde_urlform::{
    to_string, to_string_with_options, EncodeOptions, ErrorKind, KeyMapping, NilEncoding,
    SpaceEncoding,
};

fn pair_set(wire: &str) -> HashSet<&str> {
    wire.split('&').collect()
}

#[rstest]
fn encodes_nested_query_object() {
    let value = json!({"query": {"foo": "foo", "bar": 1}});
    let wire = to_string(&value).unwrap();
    assert_eq!(pair_set(&wire), HashSet::from(["query[foo]=foo", "query[bar]=1"]));
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUp {
    user_name: String,
    age: u8,
    newsletter: bool,
    referrer: Option<String>,
    interests: Vec<String>,
    address: Address,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Address {
    street_line: String,
    zip_code: String,
}

fn sign_up() -> SignUp {
    SignUp {
        user_name: "Ada Lovelace".to_string(),
        age: 36,
        newsletter: false,
        referrer: None,
        interests: vec!["math".to_string(), "engines & looms".to_string()],
        address: Address {
            street_line: "12 St. James's Square".to_string(),
            zip_code: "SW1Y".to_string(),
        },
    }
}

#[rstest]
fn encodes_struct_with_defaults() {
    let wire = to_string(&sign_up()).unwrap();
    assert_eq!(
        wire,
        "userName=Ada%20Lovelace&age=36&newsletter=false&referrer\
         &interests[]=math&interests[]=engines%20%26%20looms\
         &address[streetLine]=12%20St.%20James%27s%20Square&address[zipCode]=SW1Y"
    );
}

#[rstest]
fn encodes_struct_with_all_options() {
    let options = EncodeOptions::new()
        .with_key_mapping(KeyMapping::SnakeCase)
        .with_nil_encoding(NilEncoding::DropKey)
        .with_space_encoding(SpaceEncoding::PlusReplaced)
        .with_alphabetize_keys(true);
    let wire = to_string_with_options(&sign_up(), &options).unwrap();
    assert_eq!(
        wire,
        "address[street_line]=12+St.+James%27s+Square&address[zip_code]=SW1Y\
         &age=36&interests[]=math&interests[]=engines+%26+looms\
         &newsletter=false&user_name=Ada+Lovelace"
    );
}

#[rstest]
#[case::ampersand("a&b", "a%26b")]
#[case::equals("a=b", "a%3Db")]
#[case::percent("100%", "100%25")]
#[case::plus("1+1", "1%2B1")]
#[case::brackets("[x]", "%5Bx%5D")]
#[case::unreserved("a-b.c_d~e", "a-b.c_d~e")]
#[case::unicode("é", "%C3%A9")]
fn escapes_reserved_value_characters(#[case] value: &str, #[case] expected: &str) {
    let wire = to_string(&BTreeMap::from([("v", value)])).unwrap();
    assert_eq!(wire, format!("v={expected}"));
}

#[rstest]
fn escapes_map_key_segments_but_not_brackets() {
    let value = json!({"outer key": {"inner&key": "x"}});
    assert_eq!(to_string(&value).unwrap(), "outer%20key[inner%26key]=x");
}

struct RawBytes(Vec<u8>);

impl Serialize for RawBytes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

#[rstest]
fn encodes_scalars_canonically() {
    #[derive(Serialize)]
    struct Scalars {
        int: i64,
        big: u128,
        float: f64,
        whole: f32,
        ch: char,
        unit: (),
        bytes: RawBytes,
    }

    let value = Scalars {
        int: -42,
        big: u128::MAX,
        float: 0.1,
        whole: 3.0,
        ch: 'x',
        unit: (),
        bytes: RawBytes(b"hi!".to_vec()),
    };
    assert_eq!(
        to_string(&value).unwrap(),
        format!(
            "int=-42&big={}&float=0.1&whole=3&ch=x&unit&bytes=aGkh",
            u128::MAX
        )
    );
}

#[rstest]
fn encodes_enums() {
    #[derive(Serialize)]
    #[serde(rename_all = "lowercase")]
    enum Order {
        Asc,
    }

    #[derive(Serialize)]
    enum Filter {
        Range { from: u32, to: u32 },
        Tags(Vec<String>),
    }

    #[derive(Serialize)]
    struct Query {
        order: Order,
        filter: Filter,
        other: Filter,
    }

    let value = Query {
        order: Order::Asc,
        filter: Filter::Range { from: 1, to: 5 },
        other: Filter::Tags(vec!["a".to_string()]),
    };
    assert_eq!(
        to_string(&value).unwrap(),
        "order=asc&filter[Range][from]=1&filter[Range][to]=5&other[Tags][]=a"
    );
}

#[rstest]
#[case::number(to_string(&42))]
#[case::boolean(to_string(&true))]
#[case::list(to_string(&["a", "b"]))]
#[case::json_array(to_string(&json!([1, 2])))]
fn rejects_unkeyed_roots(#[case] result: serde_urlform::Result<String>) {
    assert_eq!(result.unwrap_err().kind(), ErrorKind::UnsupportedRootShape);
}

#[rstest]
fn rejects_nested_arrays() {
    #[derive(Serialize)]
    struct Matrix {
        rows: Vec<Vec<u8>>,
    }

    let err = to_string(&Matrix {
        rows: vec![vec![1, 2], vec![3]],
    })
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedNesting);
}

#[rstest]
fn rejects_list_elements_that_would_merge() {
    #[derive(Serialize)]
    struct Group {
        tags: Vec<String>,
    }

    #[derive(Serialize)]
    struct Board {
        groups: Vec<Group>,
    }

    let value = Board {
        groups: vec![
            Group {
                tags: vec!["a".to_string()],
            },
            Group {
                tags: vec!["b".to_string()],
            },
        ],
    };
    let err = to_string(&value).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedNesting);
    assert!(err.to_string().contains("groups[]"));

    let disjoint = json!({"points": [{"x": 1}, {"y": 2}]});
    assert_eq!(
        to_string(&disjoint).unwrap_err().kind(),
        ErrorKind::UnsupportedNesting
    );
}

#[rstest]
fn rejects_non_scalar_map_keys() {
    let value = BTreeMap::from([((1, 2), "pair")]);
    let err = to_string(&value).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Message);
}
