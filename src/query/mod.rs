//! Query serialization: normalization, ordered pairs, and server defaults.
//!
//! This module is the query half of the request serialization engine:
//!
//! - **[`normalize_query`]**: key→value map → canonical, alphabetized,
//!   deduplicated wire pairs under a configurable [`ArrayFormat`]
//! - **[`query_string`]** / **[`query_params`]**: the percent-encoded wire
//!   string and the manipulable ordered-pair container
//! - **[`drop_defaults`]**: strips parameters equal to the endpoint's
//!   documented server default, so default-valued parameters never appear
//!   on the wire
//!
//! # Determinism
//!
//! Output depends only on the input's contents, never on insertion order:
//! keys are processed in lexicographic order and list values are
//! deduplicated and sorted before rendering. Re-normalizing normalized
//! output yields the same pairs. Both properties are what make serialized
//! URLs usable as cache keys.
//!
//! # Example
//!
//! ```rust
//! use wirequest::{query_string, Params, QueryOptions};
//!
//! let params = Params::new()
//!     .set("vs_currency", "usd")
//!     .set("ids", ["ethereum", "bitcoin"]);
//!
//! assert_eq!(
//!     query_string(&params, &QueryOptions::new()),
//!     "ids=bitcoin%2Cethereum&vs_currency=usd"
//! );
//! ```

mod defaults;
mod normalize;
mod params;

pub use defaults::{drop_defaults, ServerDefaults, ServerDefaultsMap};
pub use normalize::{
    normalize_query, query_string, ArrayFormat, QueryEncodeFn, QueryOptions, QueryRules, WirePair,
};
pub use params::{query_params, QueryParams};
