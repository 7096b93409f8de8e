//! Helper macro generating port error enums with snake-case constructors.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
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

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum SampleSinkError {
            Closed => "sink closed",
            Rejected { message: String } => "rejected: {message}",
            Partial { chunk: u64 } => "partial chunk {chunk}",
            Detailed { message: String, chunk: u64 } => "chunk {chunk}: {message}",
        }
    }

    #[test]
    fn unit_variants_get_argumentless_constructors() {
        assert_eq!(SampleSinkError::closed(), SampleSinkError::Closed);
        assert_eq!(SampleSinkError::closed().to_string(), "sink closed");
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = SampleSinkError::rejected("duplicate offer");
        assert_eq!(err.to_string(), "rejected: duplicate offer");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = SampleSinkError::partial(3_u64);
        assert_eq!(err.to_string(), "partial chunk 3");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = SampleSinkError::detailed("disk full", 7_u64);
        assert_eq!(err.to_string(), "chunk 7: disk full");
    }
}
