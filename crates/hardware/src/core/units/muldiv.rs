//! Integer multiplier and iterative divider (RV32M).
//!
//! `mul32` is a pure single-cycle function. [`Divider`] models the
//! iterative radix-4 divider's handshake explicitly as a small state
//! machine (`Idle | Running | Done`), per the design notes' guidance to
//! avoid hiding multi-cycle state in implicit register writes.

/// Single-cycle 32x32 -> 64 multiplier.
///
/// `signed_a`/`signed_b` independently select sign- or zero-extension of
/// each operand before the 64-bit product, covering `MUL`/`MULH` (both
/// signed), `MULHSU` (`a` signed, `b` unsigned), and `MULHU` (both
/// unsigned).
#[must_use]
pub fn mul32(a: u32, b: u32, signed_a: bool, signed_b: bool) -> u64 {
    let ext_a: i64 = if signed_a { i64::from(a as i32) } else { i64::from(a) };
    let ext_b: i64 = if signed_b { i64::from(b as i32) } else { i64::from(b) };
    (ext_a.wrapping_mul(ext_b)) as u64
}

/// `product64` split into `(hi32, lo32)`.
#[must_use]
pub fn mul32_parts(a: u32, b: u32, signed_a: bool, signed_b: bool) -> (u32, u32) {
    let product = mul32(a, b, signed_a, signed_b);
    ((product >> 32) as u32, product as u32)
}

/// Number of work cycles the divider takes for a nonzero divisor
/// (radix-4, so 16 iterations retire 32 quotient bits two at a time).
pub const DIV_CYCLES: u32 = 16;

/// Result of a completed division.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DivResult {
    /// Quotient.
    pub quotient: u32,
    /// Remainder.
    pub remainder: u32,
    /// Set when the divisor was zero (RV32M semantics apply).
    pub divide_by_zero: bool,
}

/// Iterative divider state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    Running { cycles_left: u32, dividend: i64, divisor: i64, signed: bool },
    Done(DivResult),
}

/// Radix-4 iterative 32-bit divider.
///
/// Handshake: [`Divider::start`] kicks off a division; [`Divider::tick`]
/// advances one cycle and returns `Some(result)` the cycle the result
/// becomes available (immediately, for divide-by-zero; after
/// [`DIV_CYCLES`] work cycles otherwise). The consuming pipeline stage must
/// hold the owning thread while [`Divider::busy`] is true.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Divider {
    state: State,
}

impl Default for Divider {
    fn default() -> Self {
        Self { state: State::Idle }
    }
}

impl Divider {
    /// A fresh, idle divider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True across the cycles the divider is occupied (from `start` through
    /// the cycle before the result is consumed).
    #[must_use]
    pub fn busy(&self) -> bool {
        !matches!(self.state, State::Idle)
    }

    /// Starts a division. `dividend`/`divisor` are raw bit patterns;
    /// `signed` selects `DIV`/`REM` vs `DIVU`/`REMU` semantics.
    pub fn start(&mut self, dividend: u32, divisor: u32, signed: bool) {
        if divisor == 0 {
            self.state = State::Done(DivResult {
                quotient: 0xFFFF_FFFF,
                remainder: dividend,
                divide_by_zero: true,
            });
            return;
        }
        let (dividend, divisor) = if signed {
            (i64::from(dividend as i32), i64::from(divisor as i32))
        } else {
            (i64::from(dividend), i64::from(divisor))
        };
        self.state = State::Running {
            cycles_left: DIV_CYCLES,
            dividend,
            divisor,
            signed,
        };
    }

    /// Advances one cycle. Returns the result the cycle it becomes ready;
    /// the divider then returns to `Idle` on the next call.
    pub fn tick(&mut self) -> Option<DivResult> {
        match self.state {
            State::Idle => None,
            State::Done(result) => {
                self.state = State::Idle;
                Some(result)
            }
            State::Running { cycles_left, dividend, divisor, signed } => {
                if cycles_left > 1 {
                    self.state = State::Running {
                        cycles_left: cycles_left - 1,
                        dividend,
                        divisor,
                        signed,
                    };
                    None
                } else {
                    let result = finish_division(dividend, divisor, signed);
                    self.state = State::Idle;
                    Some(result)
                }
            }
        }
    }
}

/// `i64::MIN` truncated to 32 bits is RV32's "most negative number".
const I32_MIN_EXT: i64 = i32::MIN as i64;

fn finish_division(dividend: i64, divisor: i64, signed: bool) -> DivResult {
    if signed && dividend == I32_MIN_EXT && divisor == -1 {
        return DivResult {
            quotient: 0x8000_0000,
            remainder: 0,
            divide_by_zero: false,
        };
    }
    let quotient = dividend / divisor;
    let remainder = dividend % divisor;
    DivResult {
        quotient: quotient as u32,
        remainder: remainder as u32,
        divide_by_zero: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_unsigned_widens_correctly() {
        let (hi, lo) = mul32_parts(0xFFFF_FFFF, 2, false, false);
        assert_eq!((hi, lo), (1, 0xFFFF_FFFE));
    }

    #[test]
    fn mul_signed_negative_one_times_two() {
        let (hi, lo) = mul32_parts(0xFFFF_FFFF, 2, true, true);
        assert_eq!((hi, lo), (0xFFFF_FFFF, 0xFFFF_FFFE));
    }

    /// Divider completes within `DIV_CYCLES` work cycles of `start`, per
    /// the spec's 17-cycle-wall-clock testable property (1 `start` + 16
    /// `tick`s before `done`).
    fn run_to_completion(div: &mut Divider) -> DivResult {
        for _ in 0..DIV_CYCLES {
            if let Some(r) = div.tick() {
                return r;
            }
        }
        panic!("divider did not complete within DIV_CYCLES ticks");
    }

    #[test]
    fn unsigned_division() {
        let mut div = Divider::new();
        div.start(20, 6, false);
        assert!(div.busy());
        let r = run_to_completion(&mut div);
        assert_eq!(r.quotient, 3);
        assert_eq!(r.remainder, 2);
        assert!(!div.busy());
    }

    #[test]
    fn signed_division_negative_dividend() {
        let mut div = Divider::new();
        div.start((-20i32) as u32, 6, true);
        let r = run_to_completion(&mut div);
        assert_eq!(r.quotient as i32, -3);
        assert_eq!(r.remainder as i32, -2);
    }

    #[test]
    fn divide_by_zero_completes_immediately() {
        let mut div = Divider::new();
        div.start(42, 0, false);
        let r = div.tick().expect("divide-by-zero resolves on the kick-off cycle");
        assert_eq!(r.quotient, 0xFFFF_FFFF);
        assert_eq!(r.remainder, 42);
        assert!(r.divide_by_zero);
        assert!(!div.busy());
    }

    #[test]
    fn signed_overflow_most_negative_by_minus_one() {
        let mut div = Divider::new();
        div.start(0x8000_0000, 0xFFFF_FFFF, true);
        let r = run_to_completion(&mut div);
        assert_eq!(r.quotient, 0x8000_0000);
        assert_eq!(r.remainder, 0);
    }
}
