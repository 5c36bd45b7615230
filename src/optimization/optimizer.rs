/// An iterative update rule over a flat parameter buffer.
pub trait Optimizer {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]);
}
