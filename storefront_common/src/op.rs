//! Arithmetic boilerplate for single-field newtypes.

#[macro_export]
macro_rules! op {
    (binary $ty:ty, $op:ident, $fn:ident) => {
        impl std::ops::$op for $ty {
            type Output = Self;

            fn $fn(self, rhs: Self) -> Self::Output {
                Self(std::ops::$op::$fn(self.0, rhs.0))
            }
        }
    };
    (inplace $ty:ty, $op:ident, $fn:ident) => {
        impl std::ops::$op for $ty {
            fn $fn(&mut self, rhs: Self) {
                std::ops::$op::$fn(&mut self.0, rhs.0)
            }
        }
    };
    (unary $ty:ty, $op:ident, $fn:ident) => {
        impl std::ops::$op for $ty {
            type Output = Self;

            fn $fn(self) -> Self::Output {
                Self(std::ops::$op::$fn(self.0))
            }
        }
    };
}
