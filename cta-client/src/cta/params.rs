//! Query parameter encoding.
//!
//! The Train Tracker endpoints take flat query strings where a field may
//! repeat (`mapid=40590&mapid=40380`). Call arguments arrive as typed
//! scalars, lists and [`Route`] values; this module resolves them to
//! primitive wire values and enforces the per-field list cap.

use std::collections::BTreeMap;
use std::fmt;

use crate::route::Route;

use super::error::CtaError;

/// Most values the API accepts for one repeated field.
pub const MAX_VALUES: usize = 4;

/// Value of the fixed `outputType` field.
const OUTPUT_TYPE: &str = "JSON";

/// A single value or a list of values for one argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Number of values held.
    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(values) => values.len(),
        }
    }

    /// True for an empty list.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into a vector, preserving order.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }

    /// Convert every held value, keeping the one/many shape.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> OneOrMany<U> {
        match self {
            OneOrMany::One(value) => OneOrMany::One(f(value)),
            OneOrMany::Many(values) => OneOrMany::Many(values.into_iter().map(f).collect()),
        }
    }
}

macro_rules! one_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for OneOrMany<$ty> {
                fn from(value: $ty) -> Self {
                    OneOrMany::One(value)
                }
            }
        )*
    };
}

one_from_scalar!(u32, i64, Route);

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        OneOrMany::Many(values)
    }
}

impl<T, const N: usize> From<[T; N]> for OneOrMany<T> {
    fn from(values: [T; N]) -> Self {
        OneOrMany::Many(values.into())
    }
}

impl<T: Clone> From<&[T]> for OneOrMany<T> {
    fn from(values: &[T]) -> Self {
        OneOrMany::Many(values.to_vec())
    }
}

/// A call argument value before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Int(i64),
    Text(String),
    Route(Route),
}

impl ArgValue {
    /// Routes become their wire code; everything else passes through.
    fn resolve(self) -> WireValue {
        match self {
            ArgValue::Int(n) => WireValue::Int(n),
            ArgValue::Text(s) => WireValue::Text(s),
            ArgValue::Route(route) => WireValue::Text(route.code().to_string()),
        }
    }
}

impl From<u32> for ArgValue {
    fn from(value: u32) -> Self {
        ArgValue::Int(i64::from(value))
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Text(value)
    }
}

impl From<Route> for ArgValue {
    fn from(value: Route) -> Self {
        ArgValue::Route(value)
    }
}

/// A named call argument: one value or a list.
pub type Arg = OneOrMany<ArgValue>;

/// Lift an optional typed argument into an untyped [`Arg`].
pub fn arg<T: Into<ArgValue>>(value: Option<OneOrMany<T>>) -> Option<Arg> {
    value.map(|v| v.map(Into::into))
}

/// Lift an optional scalar into an untyped [`Arg`].
pub fn scalar<T: Into<ArgValue>>(value: Option<T>) -> Option<Arg> {
    value.map(|v| OneOrMany::One(v.into()))
}

/// A primitive value as sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireValue::Int(n) => write!(f, "{n}"),
            WireValue::Text(s) => f.write_str(s),
        }
    }
}

/// Encoded parameters for one request.
///
/// Every field maps to a list of values, even scalars. Built once per
/// call by [`ParamBuilder`] and not changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    fields: BTreeMap<String, Vec<WireValue>>,
}

impl Params {
    /// Values for a field, if it was emitted.
    pub fn get(&self, field: &str) -> Option<&[WireValue]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Whether a field was emitted.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Number of distinct fields, including `key` and `outputType`.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false: `key` and `outputType` are always present.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Flatten into query pairs, repeating the key for list values.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.clone(), v.to_string())))
            .collect()
    }
}

/// Builds [`Params`] for a fixed API key.
#[derive(Debug, Clone)]
pub struct ParamBuilder {
    key: String,
}

impl ParamBuilder {
    /// Create a builder bound to an API key.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Encode named arguments, capping each list at [`MAX_VALUES`].
    ///
    /// Absent (`None`) arguments are left out entirely. The cap applies
    /// to each list independently.
    pub fn build<'a>(
        &self,
        args: impl IntoIterator<Item = (&'a str, Option<Arg>)>,
    ) -> Result<Params, CtaError> {
        self.encode(args, Some(MAX_VALUES))
    }

    /// Encode named arguments without a list cap.
    pub fn build_unbounded<'a>(
        &self,
        args: impl IntoIterator<Item = (&'a str, Option<Arg>)>,
    ) -> Result<Params, CtaError> {
        self.encode(args, None)
    }

    fn encode<'a>(
        &self,
        args: impl IntoIterator<Item = (&'a str, Option<Arg>)>,
        max: Option<usize>,
    ) -> Result<Params, CtaError> {
        let mut fields = BTreeMap::new();
        fields.insert("key".to_string(), vec![WireValue::Text(self.key.clone())]);
        fields.insert(
            "outputType".to_string(),
            vec![WireValue::Text(OUTPUT_TYPE.to_string())],
        );

        for (name, value) in args {
            let Some(value) = value else {
                continue;
            };

            let values = match value {
                OneOrMany::One(v) => vec![v.resolve()],
                OneOrMany::Many(vs) => {
                    if let Some(max) = max
                        && vs.len() > max
                    {
                        return Err(CtaError::TooManyArguments {
                            field: name.to_string(),
                            received: vs.len(),
                            max,
                        });
                    }
                    vs.into_iter().map(ArgValue::resolve).collect()
                }
            };

            fields.insert(name.to_string(), values);
        }

        Ok(Params { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAKE_KEY: &str = "abc";

    fn builder() -> ParamBuilder {
        ParamBuilder::new(FAKE_KEY)
    }

    fn text(s: &str) -> WireValue {
        WireValue::Text(s.to_string())
    }

    #[test]
    fn always_emits_key_and_output_type() {
        let params = builder().build(Vec::<(&str, Option<Arg>)>::new()).unwrap();
        assert_eq!(params.get("key"), Some(&[text(FAKE_KEY)][..]));
        assert_eq!(params.get("outputType"), Some(&[text("JSON")][..]));
        assert_eq!(params.len(), 2);
        assert!(!params.is_empty());
    }

    #[test]
    fn scalars_become_single_element_lists() {
        let params = builder()
            .build([
                ("mapid", scalar(Some(1u32))),
                ("stpid", scalar(Some(1u32))),
            ])
            .unwrap();

        assert_eq!(params.get("mapid"), Some(&[WireValue::Int(1)][..]));
        assert_eq!(params.get("stpid"), Some(&[WireValue::Int(1)][..]));
    }

    #[test]
    fn absent_arguments_are_omitted() {
        let params = builder()
            .build([("mapid", scalar(Some(1u32))), ("max", scalar(None::<u32>))])
            .unwrap();

        assert!(params.contains("mapid"));
        assert!(!params.contains("max"));
        assert_eq!(params.fields().collect::<Vec<_>>(), ["key", "mapid", "outputType"]);
    }

    #[test]
    fn lists_pass_through() {
        let params = builder()
            .build([("mapid", arg(Some(OneOrMany::from(vec![1u32, 2, 3]))))])
            .unwrap();

        assert_eq!(
            params.get("mapid"),
            Some(&[WireValue::Int(1), WireValue::Int(2), WireValue::Int(3)][..])
        );
    }

    #[test]
    fn routes_resolve_to_codes_in_order() {
        let params = builder()
            .build([
                ("mapid", arg(Some(OneOrMany::from([1u32, 2, 3])))),
                ("rt", arg(Some(OneOrMany::from([Route::Blue, Route::Yellow])))),
            ])
            .unwrap();

        assert_eq!(params.get("rt"), Some(&[text("blue"), text("y")][..]));
    }

    #[test]
    fn single_route_resolves() {
        let params = builder()
            .build([("rt", scalar(Some(Route::Brown)))])
            .unwrap();
        assert_eq!(params.get("rt"), Some(&[text("brn")][..]));
    }

    #[test]
    fn too_many_values_names_field_and_count() {
        let err = builder()
            .build([("mapid", arg(Some(OneOrMany::from([1u32, 2, 3, 4, 5]))))])
            .unwrap_err();

        match &err {
            CtaError::TooManyArguments { field, received, max } => {
                assert_eq!(field, "mapid");
                assert_eq!(*received, 5);
                assert_eq!(*max, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("mapid"));
        assert!(msg.contains('5'));
        assert!(msg.contains('4'));
    }

    #[test]
    fn exactly_four_values_is_allowed() {
        let params = builder()
            .build([("mapid", arg(Some(OneOrMany::from([1u32, 2, 3, 4]))))])
            .unwrap();
        assert_eq!(params.get("mapid").map(<[_]>::len), Some(4));
    }

    #[test]
    fn cap_is_per_field() {
        // Four values in each of two fields is fine: 8 in total
        let params = builder()
            .build([
                ("mapid", arg(Some(OneOrMany::from([1u32, 2, 3, 4])))),
                ("stpid", arg(Some(OneOrMany::from([5u32, 6, 7, 8])))),
            ])
            .unwrap();
        assert_eq!(params.to_query_pairs().len(), 10);
    }

    #[test]
    fn unbounded_accepts_long_lists() {
        let params = builder()
            .build_unbounded([("rt", arg(Some(OneOrMany::from(Route::ALL))))])
            .unwrap();
        assert_eq!(params.get("rt").map(<[_]>::len), Some(8));
    }

    #[test]
    fn query_pairs_repeat_keys() {
        let params = builder()
            .build([("rt", arg(Some(OneOrMany::from([Route::Red, Route::Green]))))])
            .unwrap();

        let pairs = params.to_query_pairs();
        let rt: Vec<_> = pairs
            .iter()
            .filter(|(k, _)| k == "rt")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(rt, ["red", "g"]);
        assert!(pairs.contains(&("outputType".to_string(), "JSON".to_string())));
    }

    #[test]
    fn one_or_many_helpers() {
        let one = OneOrMany::from(7u32);
        assert_eq!(one.len(), 1);
        assert_eq!(one.into_vec(), vec![7]);

        let empty: OneOrMany<u32> = Vec::new().into();
        assert!(empty.is_empty());

        let slice: &[u32] = &[1, 2];
        assert_eq!(OneOrMany::from(slice), OneOrMany::Many(vec![1, 2]));
    }
}
