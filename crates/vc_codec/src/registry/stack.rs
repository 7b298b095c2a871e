use crate::key::TypeKey;

/// The chain of `(category, key)` pairs currently being resolved on this thread.
#[cfg(all(debug_assertions, feature = "debug"))]
#[derive(Default, Clone)]
pub(crate) struct ResolveStack {
    stack: Vec<(&'static str, TypeKey)>,
}

#[cfg(all(debug_assertions, feature = "debug"))]
impl ResolveStack {
    pub const fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, category: &'static str, key: TypeKey) {
        self.stack.push((category, key));
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }
}

#[cfg(all(debug_assertions, feature = "debug"))]
impl core::fmt::Debug for ResolveStack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut iter = self.stack.iter();

        if let Some((category, key)) = iter.next() {
            writeln!(f, "{category} `{key}`")?;
        }

        for (category, key) in iter {
            writeln!(f, " -> {category} `{key}`")?;
        }

        Ok(())
    }
}

#[cfg(all(debug_assertions, feature = "debug"))]
std::thread_local! {
    static RESOLVE_STACK: core::cell::RefCell<ResolveStack> =
        const { core::cell::RefCell::new(ResolveStack::new()) };
}

/// Pops its entry off the resolution stack when dropped, unwinding included.
pub(crate) struct StackFrame(());

impl Drop for StackFrame {
    #[inline]
    fn drop(&mut self) {
        #[cfg(all(debug_assertions, feature = "debug"))]
        RESOLVE_STACK.with_borrow_mut(ResolveStack::pop);
    }
}

/// Pushes `(category, key)` onto this thread's resolution stack.
#[inline]
pub(crate) fn enter(category: &'static str, key: &TypeKey) -> StackFrame {
    #[cfg(all(debug_assertions, feature = "debug"))]
    RESOLVE_STACK.with_borrow_mut(|stack| stack.push(category, key.clone()));
    #[cfg(not(all(debug_assertions, feature = "debug")))]
    let _ = (category, key);
    StackFrame(())
}

/// Appends the current resolution stack to a diagnostic message.
#[inline]
pub(crate) fn annotate(message: core::fmt::Arguments<'_>) -> String {
    #[cfg(all(debug_assertions, feature = "debug"))]
    {
        RESOLVE_STACK.with_borrow(|stack| format!("{message} (stack:\n{stack:?})"))
    }
    #[cfg(not(all(debug_assertions, feature = "debug")))]
    {
        message.to_string()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(all(test, debug_assertions, feature = "debug"))]
mod tests {
    use super::{annotate, enter};
    use crate::key::TypeKey;

    #[test]
    fn frames_nest_and_unwind() {
        {
            let _outer = enter("decoder", &TypeKey::of::<Vec<u8>>());
            let _inner = enter("decoder", &TypeKey::of::<u8>());
            assert_eq!(
                annotate(format_args!("oops")),
                "oops (stack:\ndecoder `Vec<u8>`\n -> decoder `u8`\n)"
            );
        }
        assert_eq!(annotate(format_args!("oops")), "oops (stack:\n)");
    }
}
