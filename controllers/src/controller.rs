use numerics::Result;

/// Trait for control loops generic over:
/// I: the sample the loop consumes every period.
/// The periodic task owns the loop and calls `run` once per sample.
pub trait Controller<I> {
    type Output;

    /// Run one period of the control algorithm. This is called at a fixed rate,
    /// so it must do a bounded amount of work.
    fn run(&mut self, input: I) -> Result<Self::Output>;
    /// Forget all accumulated state, keeping the configuration.
    fn reset(&mut self);
}
