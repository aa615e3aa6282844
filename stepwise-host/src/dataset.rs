//! Received dataset

/// One finished run as received from the device
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub x_label: String,
    pub y_label: String,
    /// Gain the run was started with, when known
    pub gain: Option<f32>,
    /// Points in the order they were received
    pub points: Vec<(f64, f64)>,
}

impl Dataset {
    pub fn new(x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            x_label: x_label.into(),
            y_label: y_label.into(),
            gain: None,
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn xs(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|&(x, _)| x)
    }

    pub fn ys(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|&(_, y)| y)
    }

    /// Tag the run with its gain
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = Some(gain);
        self
    }

    /// Short run label such as `Kp = 2.5`
    pub fn legend(&self) -> String {
        match self.gain {
            Some(gain) => format!("Kp = {}", gain),
            None => String::from("Kp unknown"),
        }
    }

    /// Final `y` value, i.e. where the response ended up
    pub fn final_value(&self) -> Option<f64> {
        self.points.last().map(|&(_, y)| y)
    }
}
