use super::{Relu, Sigmoid};

/// The activation applied element-wise to the output of a layer.
#[derive(Clone, Copy, Debug)]
pub enum ActFn {
    Relu(Relu),
    Sigmoid(Sigmoid),
}

impl ActFn {
    pub fn relu() -> Self {
        Self::Relu(Relu::new())
    }

    pub fn sigmoid(amp: f32) -> Self {
        Self::Sigmoid(Sigmoid::new(amp))
    }

    pub fn f(&self, x: f32) -> f32 {
        match self {
            Self::Relu(a) => a.f(x),
            Self::Sigmoid(a) => a.f(x),
        }
    }

    pub fn df(&self, x: f32) -> f32 {
        match self {
            Self::Relu(a) => a.df(x),
            Self::Sigmoid(a) => a.df(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_dispatch() {
        let act_fn = ActFn::relu();

        assert!(matches!(act_fn, ActFn::Relu(_)));
        assert_eq!(act_fn.f(-2.), 0.);
        assert_eq!(act_fn.f(3.), 3.);
        assert_eq!(act_fn.df(3.), 1.);
    }

    #[test]
    fn sigmoid_dispatch() {
        let act_fn = ActFn::sigmoid(1.);

        assert!(matches!(act_fn, ActFn::Sigmoid(_)));
        assert_eq!(act_fn.f(0.), 0.5);
        assert_eq!(act_fn.df(0.), 0.25);
    }
}
