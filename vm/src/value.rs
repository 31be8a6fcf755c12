use num_traits::AsPrimitive;

/// The ten numeric interpretations a type tag can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

/// A value in one of the ten kinds, carried between projection and
/// assignment without losing which kind it's in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
}

/// Every primitive this core moves values between implements the host's
/// `as`-cast into all ten kinds. `num_traits::AsPrimitive` already gives us
/// this for every built-in numeric type, so casting is just picking the
/// right `as_()` call — the same rule the language uses for `as` itself.
trait Cast:
    AsPrimitive<u8>
    + AsPrimitive<i8>
    + AsPrimitive<u16>
    + AsPrimitive<i16>
    + AsPrimitive<u32>
    + AsPrimitive<i32>
    + AsPrimitive<u64>
    + AsPrimitive<i64>
    + AsPrimitive<f32>
    + AsPrimitive<f64>
{
}

impl<T> Cast for T where
    T: AsPrimitive<u8>
        + AsPrimitive<i8>
        + AsPrimitive<u16>
        + AsPrimitive<i16>
        + AsPrimitive<u32>
        + AsPrimitive<i32>
        + AsPrimitive<u64>
        + AsPrimitive<i64>
        + AsPrimitive<f32>
        + AsPrimitive<f64>
{
}

fn cast_from<T: Cast>(v: T, target: Kind) -> Value {
    match target {
        Kind::U8 => Value::U8(v.as_()),
        Kind::I8 => Value::I8(v.as_()),
        Kind::U16 => Value::U16(v.as_()),
        Kind::I16 => Value::I16(v.as_()),
        Kind::U32 => Value::U32(v.as_()),
        Kind::I32 => Value::I32(v.as_()),
        Kind::U64 => Value::U64(v.as_()),
        Kind::I64 => Value::I64(v.as_()),
        Kind::F32 => Value::F32(v.as_()),
        Kind::F64 => Value::F64(v.as_()),
    }
}

impl Value {
    pub fn kind(self) -> Kind {
        match self {
            Value::U8(_) => Kind::U8,
            Value::I8(_) => Kind::I8,
            Value::U16(_) => Kind::U16,
            Value::I16(_) => Kind::I16,
            Value::U32(_) => Kind::U32,
            Value::I32(_) => Kind::I32,
            Value::U64(_) => Kind::U64,
            Value::I64(_) => Kind::I64,
            Value::F32(_) => Kind::F32,
            Value::F64(_) => Kind::F64,
        }
    }

    /// Projects this value onto `target`, following the host's ordinary
    /// numeric conversion rules (the same ones `as` applies) in both
    /// directions: narrowing, widening, sign change and int/float.
    pub fn cast(self, target: Kind) -> Value {
        match self {
            Value::U8(v) => cast_from(v, target),
            Value::I8(v) => cast_from(v, target),
            Value::U16(v) => cast_from(v, target),
            Value::I16(v) => cast_from(v, target),
            Value::U32(v) => cast_from(v, target),
            Value::I32(v) => cast_from(v, target),
            Value::U64(v) => cast_from(v, target),
            Value::I64(v) => cast_from(v, target),
            Value::F32(v) => cast_from(v, target),
            Value::F64(v) => cast_from(v, target),
        }
    }

    /// This value's bits as a `u32`, valid only when it's already in one of
    /// the three kinds an immediate operand can carry.
    pub fn as_imm_bits(self) -> u32 {
        match self {
            Value::U32(v) => v,
            Value::I32(v) => v as u32,
            Value::F32(v) => v.to_bits(),
            other => unreachable!("{:?} cannot be the kind of an immediate operand", other),
        }
    }

    pub fn as_u32(self) -> u32 {
        self.cast(Kind::U32).as_imm_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_cast_truncates_like_as() {
        let v = Value::I32(-1);
        assert_eq!(v.cast(Kind::U8), Value::U8(0xFF));
    }

    #[test]
    fn float_to_int_cast_truncates_toward_zero() {
        let v = Value::F64(3.9);
        assert_eq!(v.cast(Kind::I32), Value::I32(3));
    }

    #[test]
    fn int_to_float_cast_is_exact_for_small_values() {
        let v = Value::U16(42);
        assert_eq!(v.cast(Kind::F32), Value::F32(42.0));
    }

    #[test]
    fn widening_unsigned_cast_zero_extends() {
        let v = Value::U8(0xFF);
        assert_eq!(v.cast(Kind::U32), Value::U32(0xFF));
    }

    #[test]
    fn widening_signed_cast_sign_extends() {
        let v = Value::I8(-1);
        assert_eq!(v.cast(Kind::I32), Value::I32(-1));
    }
}
