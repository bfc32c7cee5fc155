use rand::Rng;

/// Random 128-bit identifier, hex-encoded. All entity ids use this.
pub(crate) fn random_hex() -> String {
    let n: u128 = rand::thread_rng().gen();
    format!("{n:032x}")
}

/// Declare a string id newtype with a `random()` constructor.
macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        pub struct $name(pub String);

        impl $name {
            pub fn random() -> Self {
                Self(crate::id::random_hex())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

pub(crate) use string_id;
