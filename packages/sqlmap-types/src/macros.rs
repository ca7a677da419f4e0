//! Declarative record definitions.

/// Declares a record struct and implements [`Reflect`](crate::Reflect) for it.
///
/// Field attributes map onto [`FieldDef`](crate::FieldDef) builder calls:
/// `#[sql = "..."]` sets the annotation tag, `#[embed]` marks an embedded
/// record and `#[skip]` hides the field. Doc comments are accepted and
/// dropped from the generated struct.
///
/// ```
/// use sqlmap_types::{record, Reflect};
///
/// record! {
///     #[derive(Debug, Clone, PartialEq, Default)]
///     pub struct User {
///         #[sql = "ID,primary_key"]
///         pub id: i64,
///         pub name: String,
///     }
/// }
///
/// let info = User::type_info();
/// assert_eq!(info.fields().len(), 2);
/// assert_eq!(info.fields()[0].tag(), "ID,primary_key");
/// ```
#[macro_export]
macro_rules! record {
    (@count) => { 0usize };
    (@count $head:ident $($tail:ident)*) => {
        1usize + $crate::record!(@count $($tail)*)
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$attr:ident $(= $tag:literal)?])*
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $fvis $field: $fty, )*
        }

        impl $crate::Reflect for $name {
            fn type_info() -> $crate::TypeInfo {
                $crate::TypeInfo::of::<$name>($crate::Kind::Struct).with_fields(vec![
                    $(
                        $crate::FieldDef::new(
                            stringify!($field),
                            <$fty as $crate::Reflect>::type_info,
                        )
                        $( .$attr($($tag)?) )*
                    ),*
                ])
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Record(vec![
                    $( $crate::Reflect::to_value(&self.$field) ),*
                ])
            }

            fn from_value(
                value: $crate::Value,
            ) -> ::std::result::Result<Self, $crate::ValueError> {
                let fields = value.into_record(
                    stringify!($name),
                    $crate::record!(@count $($field)*),
                )?;
                #[allow(unused_mut, unused_variables)]
                let mut fields = fields.into_iter();
                Ok(Self {
                    $(
                        $field: <$fty as $crate::Reflect>::from_value(
                            fields.next().unwrap_or($crate::Value::Null),
                        )?,
                    )*
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Kind, Reflect, Value};

    crate::record! {
        #[derive(Debug, Clone, PartialEq, Default)]
        struct Address {
            city: String,
            zip: Option<u32>,
        }
    }

    crate::record! {
        #[derive(Debug, Clone, PartialEq, Default)]
        struct Person {
            /// Surrogate key.
            #[sql = "ID,primary_key"]
            id: i64,
            #[embed]
            address: Address,
            #[skip]
            scratch: String,
        }
    }

    #[test]
    fn test_record_type_info() {
        let info = Person::type_info();
        assert_eq!(info.kind(), Kind::Struct);
        let fields = info.fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name(), "id");
        assert_eq!(fields[0].tag(), "ID,primary_key");
        assert!(fields[1].is_embedded());
        assert_eq!(fields[2].tag(), "-");
    }

    #[test]
    fn test_record_value_round_trip() {
        let person = Person {
            id: 7,
            address: Address {
                city: "Kuala Lumpur".into(),
                zip: Some(50450),
            },
            scratch: String::new(),
        };
        let value = person.to_value();
        assert_eq!(
            value,
            Value::Record(vec![
                Value::Int(7),
                Value::Record(vec![
                    Value::String("Kuala Lumpur".into()),
                    Value::Uint(50450)
                ]),
                Value::String(String::new()),
            ])
        );
        assert_eq!(Person::from_value(value), Ok(person));
    }

    #[test]
    fn test_record_zero_value_shape() {
        let zero = Person::type_info().zero_value();
        assert_eq!(Person::from_value(zero), Ok(Person::default()));
    }
}
