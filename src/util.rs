/// Partial results: the elements that went through and the ones that failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiResult<T, E> {
    ok: Vec<T>,
    err: Vec<E>,
}

impl<T, E> MultiResult<T, E> {
    /// Create a new [MultiResult]
    pub fn new() -> Self {
        Self {
            ok: Vec::new(),
            err: Vec::new(),
        }
    }
    /// Push an ok element
    pub fn push_ok(&mut self, t: T) {
        self.ok.push(t);
    }
    /// Push an err element
    pub fn push_err(&mut self, e: E) {
        self.err.push(e);
    }
    /// Push from a result
    pub fn push(&mut self, res: Result<T, E>) {
        match res {
            Ok(v) => self.push_ok(v),
            Err(e) => self.push_err(e),
        }
    }
    /// Returns if there is at least one err element
    pub fn has_err(&self) -> bool {
        !self.err.is_empty()
    }
    /// Ok elements, in push order
    pub fn oks(&self) -> &[T] {
        &self.ok
    }
    /// Err elements, in push order
    pub fn errs(&self) -> &[E] {
        &self.err
    }
    /// Consume the result and return the ok and err [Vec]
    pub fn extract(self) -> (Vec<T>, Vec<E>) {
        (self.ok, self.err)
    }
}
impl<T, E> Default for MultiResult<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::MultiResult;

    #[test]
    fn push_splits_results() {
        let mut res: MultiResult<u8, &str> = MultiResult::new();
        res.push(Ok(1));
        res.push(Err("bad"));
        res.push_ok(2);
        assert!(res.has_err());
        assert_eq!(res.oks(), &[1, 2]);
        assert_eq!(res.extract(), (vec![1, 2], vec!["bad"]));
    }
}
