//! Case sources.
//!
//! A source is anything that can hand the runner a fresh, ordered sequence
//! of cases at the start of a run:
//!
//! - literal sequences (`Vec<Case>` and `[Case; N]`)
//! - [`Generated`], a zero-argument function evaluated on every run
//! - any type implementing [`CaseSource`] directly, the provider-object shape
//! - [`TableSource`](crate::table::TableSource), a YAML case table on disk
//!
//! Sources hand out iterators rather than vectors so the runner can bound
//! how many cases it is willing to pull from a source that never ends.

use crate::case::{Case, CaseError};
use crate::error::ConfigResult;

pub type CaseIter<'a, I, V, E> = Box<dyn Iterator<Item = Case<I, V, E>> + 'a>;

/// A finite, restartable, ordered provider of cases.
pub trait CaseSource<I, V, E: CaseError> {
    /// Name used in configuration errors.
    fn source_name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// Starts a fresh pass over the cases. Called once per run.
    fn iter_cases(&self) -> ConfigResult<CaseIter<'_, I, V, E>>;
}

impl<I: Clone, V: Clone, E: CaseError> CaseSource<I, V, E> for Vec<Case<I, V, E>> {
    fn source_name(&self) -> String {
        "inline cases".to_string()
    }

    fn iter_cases(&self) -> ConfigResult<CaseIter<'_, I, V, E>> {
        Ok(Box::new(self.iter().cloned()))
    }
}

impl<I: Clone, V: Clone, E: CaseError, const N: usize> CaseSource<I, V, E> for [Case<I, V, E>; N] {
    fn source_name(&self) -> String {
        "inline cases".to_string()
    }

    fn iter_cases(&self) -> ConfigResult<CaseIter<'_, I, V, E>> {
        Ok(Box::new(self.iter().cloned()))
    }
}

impl<I, V, E: CaseError, S: CaseSource<I, V, E> + ?Sized> CaseSource<I, V, E> for &S {
    fn source_name(&self) -> String {
        (**self).source_name()
    }

    fn iter_cases(&self) -> ConfigResult<CaseIter<'_, I, V, E>> {
        (**self).iter_cases()
    }
}

/// Cases computed by a function each time a run starts.
pub struct Generated<F> {
    name: String,
    generator: F,
}

/// Wraps a zero-argument case generator.
pub fn generated<F>(name: impl Into<String>, generator: F) -> Generated<F> {
    Generated {
        name: name.into(),
        generator,
    }
}

impl<F, It, I, V, E> CaseSource<I, V, E> for Generated<F>
where
    F: Fn() -> It,
    It: IntoIterator<Item = Case<I, V, E>>,
    It::IntoIter: 'static,
    E: CaseError,
{
    fn source_name(&self) -> String {
        self.name.clone()
    }

    fn iter_cases(&self) -> ConfigResult<CaseIter<'_, I, V, E>> {
        Ok(Box::new((self.generator)().into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::CalcError;
    use std::cell::Cell;

    #[test]
    fn literal_sources_restart_from_the_top() {
        let cases: Vec<Case<i32, i32, CalcError>> = vec![Case::value(1, 1), Case::value(2, 2)];
        let first: Vec<_> = cases.iter_cases().unwrap().map(|c| *c.input()).collect();
        let second: Vec<_> = cases.iter_cases().unwrap().map(|c| *c.input()).collect();
        assert_eq!(first, vec![1, 2]);
        assert_eq!(first, second);
    }

    #[test]
    fn generator_is_evaluated_on_every_pass() {
        let calls = Cell::new(0);
        let source = generated("counting", || {
            calls.set(calls.get() + 1);
            vec![Case::<i32, i32, CalcError>::value(calls.get(), 0)]
        });
        let _ = source.iter_cases().unwrap().count();
        let _ = source.iter_cases().unwrap().count();
        assert_eq!(calls.get(), 2);
        assert_eq!(source.source_name(), "counting");
    }
}
