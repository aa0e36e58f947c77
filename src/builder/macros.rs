//! Macros for ergonomic machine construction.

/// Declare a fieldless enum usable as a state value.
///
/// Derives the traits [`State`](crate::core::State) requires and names each
/// variant after its identifier.
///
/// # Example
///
/// ```
/// use switchyard::core::{Definition, State};
/// use switchyard::state_enum;
///
/// state_enum! {
///     pub enum Light {
///         Red,
///         Green,
///     }
/// }
///
/// let definition: Definition<Light, ()> = Definition::builder(Light::Red)
///     .state(Light::Red, |s| s.on("NEXT", Light::Green))
///     .state(Light::Green, |s| s.on("NEXT", Light::Red))
///     .build();
///
/// assert_eq!(definition.initial.name(), "Red");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
