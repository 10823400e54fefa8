/// Defines the strategy for updating model parameters based on calculated gradients.
pub trait Optimizer {
    /// Updates `params` in place using `grad`, both of the same length.
    fn update_params(&mut self, params: &mut [f64], grad: &[f64]);
}
