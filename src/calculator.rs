/// Display sentinel shown when a result is not a real number.
///
/// Once shown, it absorbs every event except [`Event::Clear`].
pub const UNDEFINED: &str = "Undefined";

/// The four keypad operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// The `+` key
    Add,
    /// The `-` key
    Sub,
    /// The `*` key
    Mul,
    /// The `/` key
    Div,
}

impl Operator {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
        }
    }

    /// Apply `percent` of `stored` the way the `%` key reads under this
    /// operator: `50 + 10 %` is 50 plus ten percent of 50, `50 * 10 %` is
    /// ten percent of 50, and the division reading is the reciprocal one.
    fn percent_of(self, stored: f64, percent: f64) -> f64 {
        match self {
            Self::Add => stored + stored * percent / 100.0,
            Self::Sub => stored - stored * percent / 100.0,
            Self::Mul => stored * (percent / 100.0),
            // percent == 0 divides by zero here; the non-finite result is
            // displayed as Undefined like the `=` path
            Self::Div => stored / (percent / 100.0),
        }
    }
}

/// A discrete calculator input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A digit key, 0 through 9
    Digit(u8),
    /// The decimal point
    Decimal,
    /// One of the four operator keys
    Op(Operator),
    /// The `=` key
    Equals,
    /// The `%` key
    Percent,
    /// The `√` key
    Sqrt,
    /// Toggle a leading minus on the display
    SignFlip,
    /// The `⟵` key
    Backspace,
    /// The `C` key
    Clear,
}

impl Event {
    /// Map a keypad button caption to its event.
    ///
    /// # Examples
    /// ```
    /// use plotcalc::{Event, Operator};
    ///
    /// assert_eq!(Event::from_label("7"), Some(Event::Digit(7)));
    /// assert_eq!(Event::from_label("+"), Some(Event::Op(Operator::Add)));
    /// assert_eq!(Event::from_label("√"), Some(Event::Sqrt));
    /// assert_eq!(Event::from_label("what"), None);
    /// ```
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "C" => Some(Self::Clear),
            "⟵" => Some(Self::Backspace),
            "√" => Some(Self::Sqrt),
            "%" => Some(Self::Percent),
            "=" => Some(Self::Equals),
            "." => Some(Self::Decimal),
            "+" => Some(Self::Op(Operator::Add)),
            "-" => Some(Self::Op(Operator::Sub)),
            "*" => Some(Self::Op(Operator::Mul)),
            "/" => Some(Self::Op(Operator::Div)),
            _ => {
                let mut chars = label.chars();
                match (chars.next(), chars.next()) {
                    (Some(digit @ '0'..='9'), None) => {
                        Some(Self::Digit(digit as u8 - b'0'))
                    }
                    _ => None,
                }
            }
        }
    }

    /// Map a keyboard key, as reported by the input adapter, to its event.
    ///
    /// Digits, the decimal point and the operators map directly; `,` is
    /// accepted as the decimal point, `Escape` clears, `Backspace` erases
    /// and `o`/`O` flips the sign. Everything else is `None` and should be
    /// left to the rest of the application.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "o" | "O" => Some(Self::SignFlip),
            "Escape" => Some(Self::Clear),
            "Backspace" => Some(Self::Backspace),
            "," => Some(Self::Decimal),
            "=" | "." | "+" | "-" | "*" | "/" => Self::from_label(key),
            digit if digit.len() == 1 && digit.chars().all(|c| c.is_ascii_digit()) => {
                Self::from_label(digit)
            }
            _ => None,
        }
    }
}

/// A stored first operand together with its selected operator.
///
/// Keeping both in one value makes the state invariant structural: there is
/// never a pending operator without a stored operand.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    operand: f64,
    op: Operator,
}

/// The keypad calculator state machine.
///
/// The state is a display string plus an optional stored operand with its
/// pending operator, transformed in place by [`Calculator::press`]. Events
/// whose preconditions do not hold leave the state unchanged; they are not
/// errors.
///
/// # Examples
/// ```
/// use plotcalc::{Calculator, Event};
///
/// let mut calc = Calculator::default();
/// for label in &["7", "+", "3", "="] {
///     calc.press(Event::from_label(label).unwrap());
/// }
/// assert_eq!(calc.display(), "10");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Calculator {
    display: String,
    pending: Option<Pending>,
}

impl Calculator {
    /// Create a calculator with an empty display
    pub fn new() -> Self {
        Self::default()
    }

    /// The current display text, to be rendered as-is
    pub fn display(&self) -> &str {
        &self.display
    }

    /// The selected operator awaiting its second operand, for the adapter
    /// to highlight on the keypad
    pub fn pending_operator(&self) -> Option<Operator> {
        self.pending.map(|pending| pending.op)
    }

    /// Check if the display shows the absorbing [`UNDEFINED`] sentinel
    pub fn is_undefined(&self) -> bool {
        self.display == UNDEFINED
    }

    /// Feed one input event through the state machine.
    pub fn press(&mut self, event: Event) {
        // Undefined blocks everything until the display is cleared
        if self.is_undefined() && event != Event::Clear {
            return;
        }
        match event {
            Event::Digit(digit) => self.digit(digit),
            Event::Decimal => self.decimal(),
            Event::Op(op) => self.operator(op),
            Event::Equals => self.equals(),
            Event::Percent => self.percent(),
            Event::Sqrt => self.sqrt(),
            Event::SignFlip => self.sign_flip(),
            Event::Backspace => self.backspace(),
            Event::Clear => self.clear(),
        }
    }

    fn digit(&mut self, digit: u8) {
        debug_assert!(digit < 10);
        self.display.push(char::from(b'0' + digit));
        while self.display.len() > 1 && self.display.starts_with('0') {
            self.display.remove(0);
        }
        if self.display.starts_with('.') {
            self.display.insert(0, '0');
        }
    }

    fn decimal(&mut self) {
        if self.display.is_empty() {
            self.display.push('0');
        }
        if !self.display.contains('.') {
            self.display.push('.');
        }
    }

    fn operator(&mut self, op: Operator) {
        // A second operator press only replaces the selection
        if let Some(pending) = &mut self.pending {
            pending.op = op;
            return;
        }
        // An empty or bare-minus display holds no operand yet: ignore
        if let Ok(operand) = self.display.parse::<f64>() {
            self.pending = Some(Pending { operand, op });
            self.display.clear();
        }
    }

    fn equals(&mut self) {
        if let Some(Pending { operand, op }) = self.pending {
            if let Ok(rhs) = self.display.parse::<f64>() {
                self.set_result(op.apply(operand, rhs));
                self.pending = None;
            }
        }
    }

    fn percent(&mut self) {
        if let Some(Pending { operand, op }) = self.pending {
            if let Ok(percent) = self.display.parse::<f64>() {
                self.set_result(op.percent_of(operand, percent));
                self.pending = None;
            }
        }
    }

    fn sqrt(&mut self) {
        if let Ok(value) = self.display.parse::<f64>() {
            self.set_result(libm::sqrt(value));
        }
    }

    fn sign_flip(&mut self) {
        if self.display.starts_with('-') {
            self.display.remove(0);
        } else {
            self.display.insert(0, '-');
        }
    }

    fn backspace(&mut self) {
        self.display.pop();
        if self.display == "-" {
            self.display.clear();
        }
    }

    fn clear(&mut self) {
        if !self.display.is_empty() {
            self.display.clear();
        } else if let Some(Pending { operand, .. }) = self.pending.take() {
            self.display = format_number(operand);
        }
    }

    fn set_result(&mut self, value: f64) {
        self.display = if value.is_finite() {
            format_number(value)
        } else {
            UNDEFINED.to_string()
        };
    }
}

/// Format a result the way the display shows numbers: integers without a
/// decimal part, everything else in the shortest float form.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
