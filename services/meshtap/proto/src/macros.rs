/// Declares a protobuf enumeration together with its canonical name table.
///
/// Expands to a `prost::Enumeration` enum, `as_str_name`/`from_str_name`
/// lookups and a [`crate::mapping::NamedEnum`] impl so fields of this type
/// can be rendered by name in structured mappings.
macro_rules! proto_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal => $text:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $name {
            /// Canonical protocol name of this value
            pub fn as_str_name(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }

            /// Look a value up by its canonical protocol name
            pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
                match value {
                    $( $text => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl $crate::mapping::NamedEnum for $name {
            fn name_of(value: i32) -> ::core::option::Option<&'static str> {
                Self::try_from(value).ok().map(|v| v.as_str_name())
            }

            fn value_of(name: &str) -> ::core::option::Option<i32> {
                Self::from_str_name(name).map(|v| v as i32)
            }
        }
    };
}
