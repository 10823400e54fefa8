use ndarray::prelude::*;

use crate::{
    arch::activations::ActFn,
    optimization::{GradientDescentWithMomentum, Optimizer},
};

/// A fully connected layer whose parameters live in a single flat buffer: the
/// `(n, m)` weights followed by the `m` biases.
#[derive(Debug, Clone)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: ActFn,
    params: Vec<f64>,
    grad: Vec<f64>,
    optimizer: GradientDescentWithMomentum,

    // Forward metadata
    x: Array1<f64>,
    a: Array1<f64>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The `(inputs, outputs)` dimensions.
    /// * `act_fn` - The activation applied to every output.
    /// * `params` - The initial parameters, `(dim.0 + 1) * dim.1` of them.
    /// * `optimizer` - The rule used to update the parameters on `backward`.
    pub fn new(
        dim: (usize, usize),
        act_fn: ActFn,
        params: Vec<f64>,
        optimizer: GradientDescentWithMomentum,
    ) -> Self {
        debug_assert_eq!(params.len(), Self::size_of(dim));

        Self {
            dim,
            act_fn,
            grad: vec![0.0; params.len()],
            params,
            optimizer,
            x: Array1::zeros(dim.0),
            a: Array1::zeros(dim.1),
        }
    }

    /// Returns the amount of parameters a layer of dimensions `dim` has.
    pub fn size_of((n, m): (usize, usize)) -> usize {
        (n + 1) * m
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// Computes the layer's output and keeps what `backward` needs.
    pub fn forward(&mut self, x: ArrayView1<f64>, gamma: f64) -> ArrayView1<'_, f64> {
        self.a = self.predict(x, gamma);
        self.x = x.to_owned();
        self.a.view()
    }

    /// Computes the layer's output without touching its metadata.
    pub fn predict(&self, x: ArrayView1<f64>, gamma: f64) -> Array1<f64> {
        let (w, b) = Self::view_params(self.dim, &self.params);
        let act_fn = self.act_fn;
        (x.dot(&w) + b).mapv_into(|z| act_fn.f(z, gamma))
    }

    /// Propagates `d`, the derivative of the loss with respect to this layer's
    /// output, updates the parameters and returns the derivative with respect to
    /// the layer's input.
    pub fn backward(&mut self, mut d: Array1<f64>, gamma: f64) -> Array1<f64> {
        let act_fn = self.act_fn;
        d.zip_mut_with(&self.a, |d, &a| *d *= act_fn.df(a, gamma));

        {
            let (mut dw, mut db) = Self::view_grad(self.dim, &mut self.grad);
            for (mut row, &x) in dw.rows_mut().into_iter().zip(&self.x) {
                row.assign(&(&d * x));
            }
            db.assign(&d);
        }

        let (w, _) = Self::view_params(self.dim, &self.params);
        let d_prev = w.dot(&d);

        self.optimizer.update_params(&mut self.params, &self.grad);
        d_prev
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases.
    fn view_grad(
        dim: (usize, usize),
        grad: &mut [f64],
    ) -> (ArrayViewMut2<'_, f64>, ArrayViewMut1<'_, f64>) {
        let w_size = dim.0 * dim.1;
        let (dw_raw, db_raw) = grad.split_at_mut(w_size);
        let dw = ArrayViewMut2::from_shape(dim, dw_raw).expect("gradient matches the layer shape");
        let db = ArrayViewMut1::from(db_raw);
        (dw, db)
    }

    /// Gives a view of the raw parameter slice as the weights and biases.
    fn view_params(
        dim: (usize, usize),
        params: &[f64],
    ) -> (ArrayView2<'_, f64>, ArrayView1<'_, f64>) {
        let w_size = dim.0 * dim.1;
        let (w_raw, b_raw) = params.split_at(w_size);
        let weights = ArrayView2::from_shape(dim, w_raw).expect("parameters match the layer shape");
        let biases = ArrayView1::from(b_raw);
        (weights, biases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(params: Vec<f64>, lr: f64) -> Dense {
        let optimizer = GradientDescentWithMomentum::new(params.len(), lr, 0.0);
        Dense::new((2, 1), ActFn::Linear, params, optimizer)
    }

    #[test]
    fn forward_is_affine() {
        let mut dense = layer(vec![1.0, 2.0, 0.5], 0.1);
        let x = array![3.0, 4.0];

        let y = dense.forward(x.view(), 1.0);

        assert_eq!(y, array![11.5]);
    }

    #[test]
    fn backward_steps_against_the_gradient() {
        let mut dense = layer(vec![1.0, 1.0, 0.0], 0.5);
        let x = array![1.0, 2.0];
        dense.forward(x.view(), 1.0);

        let d_prev = dense.backward(array![1.0], 1.0);

        assert_eq!(d_prev, array![1.0, 1.0]);
        assert_eq!(dense.params, vec![0.5, 0.0, -0.5]);
    }
}
