/// Declare a pack schema: a struct of fields and nested containers, its
/// shared schema value, and its member list in declaration order.
///
/// ```ignore
/// pack_schema! {
///     pub struct UserPreferencesPack {
///         pub use_stream_markers: BoolField =
///             Field::new("usm").doc("Use stream markers?").with_default(false),
///     }
/// }
/// ```
#[macro_export]
macro_rules! pack_schema {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty = $init:expr
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::pack::PackSchema for $name {
            const PATH: &'static str = concat!(module_path!(), "::", stringify!($name));

            fn schema() -> &'static Self {
                static SCHEMA: ::std::sync::LazyLock<$name> =
                    ::std::sync::LazyLock::new(|| $name {
                        $( $field: $init, )*
                    });

                &SCHEMA
            }

            fn members(&self) -> ::std::vec::Vec<$crate::pack::Member<'_, Self>> {
                ::std::vec![
                    $( $crate::pack::Member::new(stringify!($field), &self.$field), )*
                ]
            }
        }
    };
}

/// Attach containers to an owning type. Each container becomes an
/// associated accessor returning a static declaration, and the type
/// implements `OwnerSchema`. Accessors are `pub` unless a visibility is
/// written before `impl`.
///
/// ```ignore
/// owner_schema! {
///     impl User {
///         preferences: SingleContainer<UserPreferencesPack> = SingleContainer::new("p"),
///     }
/// }
/// let prefs = User::preferences().get(&user)?;
/// ```
#[macro_export]
macro_rules! owner_schema {
    (
        impl $owner:ident { $($body:tt)* }
    ) => {
        $crate::owner_schema! { pub impl $owner { $($body)* } }
    };
    (
        $vis:vis impl $owner:ident {
            $(
                $(#[$meta:meta])*
                $name:ident : $ty:ty = $init:expr
            ),* $(,)?
        }
    ) => {
        impl $owner {
            $(
                $(#[$meta])*
                #[must_use]
                $vis fn $name() -> &'static $ty {
                    static CONTAINER: $ty = $init;

                    &CONTAINER
                }
            )*
        }

        impl $crate::owner::OwnerSchema for $owner {
            const PATH: &'static str = concat!(module_path!(), "::", stringify!($owner));

            fn containers() -> ::std::vec::Vec<$crate::container::ContainerDescriptor> {
                ::std::vec![
                    $( Self::$name().describe(stringify!($name)), )*
                ]
            }
        }
    };
}
