//! Error enums for driven ports.
//!
//! Every variant gets a snake_case constructor taking `impl Into<_>` fields.
//! Storage ports name their backend with `for "..."`: they share `Connection`
//! and `Query` variants, tag each extra variant with the domain error it
//! becomes, and convert into [`crate::domain::Error`] so services propagate
//! them with `?`. Transport ports (SMS, email) list their variants only and
//! are handled case by case.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident for $backend:literal {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )?
                    => $message:literal as $kind:ident
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            /// The backend could not be reached.
            #[error("{backend} connection failed: {message}", backend = $backend)]
            Connection { message: String },
            /// Query or mutation failed during execution.
            #[error("{backend} query failed: {message}", backend = $backend)]
            Query { message: String },
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            define_port_error!(@ctor Connection { message: String });
            define_port_error!(@ctor Query { message: String });
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }

        impl From<$name> for $crate::domain::Error {
            fn from(error: $name) -> Self {
                match error {
                    $name::Connection { message } => {
                        Self::service_unavailable(format!("{} unavailable: {message}", $backend))
                    }
                    $name::Query { message } => {
                        Self::internal(format!("{} error: {message}", $backend))
                    }
                    $(
                        other @ $name::$variant { .. } => Self::$kind(other.to_string()),
                    )*
                }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;
