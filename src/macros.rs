/// Declares a `u32`-backed wire enum whose unrecognised values are preserved in an
/// `Unknown(u32)` variant, so decoding never fails on (and re-encoding never loses) a value
/// newer than this crate.
///
/// Deserializing `Unknown(v)` where `v` names a known variant yields that variant, so a
/// value has a single representation however it was built.
macro_rules! raw_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
            /// A value this crate does not know about, kept verbatim.
            Unknown(u32),
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                match value {
                    $($value => $name::$variant,)+
                    other => $name::Unknown(other),
                }
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> u32 {
                match value {
                    $($name::$variant => $value,)+
                    $name::Unknown(other) => other,
                }
            }
        }

        const _: () = {
            #[derive(serde::Deserialize)]
            enum Repr {
                $($variant,)+
                Unknown(u32),
            }

            impl<'de> serde::Deserialize<'de> for $name {
                fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
                where
                    D: serde::Deserializer<'de>,
                {
                    Ok(match Repr::deserialize(deserializer)? {
                        $(Repr::$variant => $name::$variant,)+
                        Repr::Unknown(other) => $name::from(other),
                    })
                }
            }
        };
    };
}
