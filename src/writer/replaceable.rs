use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::Close;
use crate::error::Error;

struct Inner<W, F, C> {
    constructor: C,
    writer: Option<Arc<W>>,
    flag: F,
}

/// A writer whose destination is (re)built on demand.
///
/// Every write first calls the constructor with the flag it returned last
/// time. `Ok(Some((writer, flag)))` closes the held writer and installs the
/// new one; `Ok(None)` keeps everything as it is. The first write therefore
/// constructs the writer, later writes may rotate it. The constructor runs on
/// every write and has to be cheap when nothing changes.
///
/// Resolution is serialized by a mutex, the write itself is not: the held
/// writer is shared with `&W: Write`, like `&File`, so concurrent writers go
/// through it directly.
pub struct ReplaceableWriter<W, F, C> {
    inner: Mutex<Inner<W, F, C>>,
}

impl<W, F, C> ReplaceableWriter<W, F, C>
where
    C: FnMut(&F) -> io::Result<Option<(W, F)>>,
{
    /// The constructor is first called with `F::default()`.
    pub fn new(constructor: C) -> Self
    where
        F: Default,
    {
        Self::with_flag(F::default(), constructor)
    }

    pub fn with_flag(flag: F, constructor: C) -> Self {
        Self {
            inner: Mutex::new(Inner {
                constructor,
                writer: None,
                flag,
            }),
        }
    }

    pub fn flag(&self) -> F
    where
        F: Clone,
    {
        self.inner.lock().flag.clone()
    }

    pub fn is_constructed(&self) -> bool {
        self.inner.lock().writer.is_some()
    }
}

impl<W, F, C> ReplaceableWriter<W, F, C>
where
    for<'a> &'a W: Write + Close,
    C: FnMut(&F) -> io::Result<Option<(W, F)>>,
{
    /// Closes the held writer. The flag is kept, so a later write asks the
    /// constructor for a writer again.
    pub fn close(&self) -> io::Result<()> {
        let writer = self.inner.lock().writer.take();
        match writer {
            Some(writer) => {
                debug!("closing replaceable writer");
                close_shared::<W>(&writer)
            }
            None => Ok(()),
        }
    }

    fn resolve(&self) -> io::Result<Arc<W>> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if let Some((writer, flag)) = (inner.constructor)(&inner.flag)? {
            match &inner.writer {
                Some(previous) => {
                    if let Err(err) = close_shared::<W>(previous) {
                        let _ = close_shared::<W>(&writer);
                        return Err(Error::ClosePrevious(err).into());
                    }
                    debug!("replaced writer");
                }
                None => debug!("constructed writer"),
            }
            inner.writer = Some(Arc::new(writer));
            inner.flag = flag;
        }

        inner
            .writer
            .clone()
            .ok_or_else(|| Error::NotConstructed.into())
    }
}

fn close_shared<W>(writer: &W) -> io::Result<()>
where
    for<'a> &'a W: Close,
{
    let mut writer = writer;
    writer.close()
}

impl<W, F, C> Write for &ReplaceableWriter<W, F, C>
where
    for<'a> &'a W: Write + Close,
    C: FnMut(&F) -> io::Result<Option<(W, F)>>,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let writer = self.resolve()?;
        let n = (&*writer).write(buf)?;
        Ok(n)
    }

    /// Flushes the held writer without consulting the constructor.
    fn flush(&mut self) -> io::Result<()> {
        let writer = self.inner.lock().writer.clone();
        match writer {
            Some(writer) => (&*writer).flush(),
            None => Ok(()),
        }
    }
}

impl<W, F, C> Write for ReplaceableWriter<W, F, C>
where
    for<'a> &'a W: Write + Close,
    C: FnMut(&F) -> io::Result<Option<(W, F)>>,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self).flush()
    }
}

impl<W, F, C> Close for &ReplaceableWriter<W, F, C>
where
    for<'a> &'a W: Write + Close,
    C: FnMut(&F) -> io::Result<Option<(W, F)>>,
{
    fn close(&mut self) -> io::Result<()> {
        ReplaceableWriter::<W, F, C>::close(*self)
    }
}

impl<W, F, C> Close for ReplaceableWriter<W, F, C>
where
    for<'a> &'a W: Write + Close,
    C: FnMut(&F) -> io::Result<Option<(W, F)>>,
{
    fn close(&mut self) -> io::Result<()> {
        ReplaceableWriter::<W, F, C>::close(self)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;
    use crate::writer::testing::Spy;
    use crate::writer::NopCloser;

    #[test]
    fn test_replaceable_writer_threads_flag() -> io::Result<()> {
        let current = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&current);
        let mut w = ReplaceableWriter::new(move |flag: &usize| {
            let flag = flag + 1;
            seen.store(flag, Ordering::SeqCst);
            Ok(Some((NopCloser::new(io::sink()), flag)))
        });

        assert_eq!(current.load(Ordering::SeqCst), 0);
        assert!(!w.is_constructed());

        for i in 1..10 {
            assert_eq!(w.write(b"test")?, 4);
            assert_eq!(current.load(Ordering::SeqCst), i);
            assert_eq!(w.flag(), i);
        }

        Close::close(&mut w)
    }

    #[test]
    fn test_replaceable_writer_infers_sink_from_constructor() -> io::Result<()> {
        let w = ReplaceableWriter::new(|f: &u32| Ok(Some((NopCloser::new(io::sink()), f + 1))));
        (&w).write_all(b"a")?;
        (&w).write_all(b"b")?;
        assert_eq!(w.flag(), 2);
        w.close()
    }

    fn planned(plan: Vec<Option<Spy>>) -> impl FnMut(&u32) -> io::Result<Option<(Spy, u32)>> {
        let mut plan = plan.into_iter();
        move |flag: &u32| Ok(plan.next().flatten().map(|spy| (spy, flag + 1)))
    }

    #[test]
    fn test_replaceable_writer_none_keeps_writer() -> io::Result<()> {
        let first = Spy::default();
        let w = ReplaceableWriter::new(planned(vec![Some(first.clone()), None, None]));

        (&w).write_all(b"a")?;
        (&w).write_all(b"b")?;
        (&w).write_all(b"c")?;

        assert_eq!(first.writes(), ["a", "b", "c"]);
        assert_eq!(first.closes(), 0);
        assert_eq!(w.flag(), 1);
        Ok(())
    }

    #[test]
    fn test_replaceable_writer_replaces_and_closes_previous() -> io::Result<()> {
        let first = Spy::default();
        let second = Spy::default();
        let w = ReplaceableWriter::new(planned(vec![
            Some(first.clone()),
            Some(second.clone()),
        ]));

        (&w).write_all(b"one")?;
        (&w).write_all(b"two")?;

        assert_eq!(first.writes(), ["one"]);
        assert_eq!(first.closes(), 1);
        assert_eq!(second.writes(), ["two"]);
        assert_eq!(second.closes(), 0);
        assert_eq!(w.flag(), 2);
        Ok(())
    }

    #[test]
    fn test_replaceable_writer_close_previous_failure_aborts_swap() -> io::Result<()> {
        let old = Spy::failing_close();
        let new = Spy::default();
        let w = ReplaceableWriter::new(planned(vec![Some(old.clone()), Some(new.clone()), None]));

        (&w).write_all(b"before")?;

        let err = (&w).write(b"lost").unwrap_err();
        assert!(matches!(
            Error::downcast(&err),
            Some(Error::ClosePrevious(_))
        ));
        assert_eq!(err.to_string(), "close previous writer: close failed");
        assert_eq!(old.closes(), 1);
        assert_eq!(new.closes(), 1);
        assert!(new.writes().is_empty());
        assert_eq!(w.flag(), 1);

        (&w).write_all(b"after")?;
        assert_eq!(old.writes(), ["before", "after"]);
        Ok(())
    }

    #[test]
    fn test_replaceable_writer_constructor_error() {
        let mut calls = 0;
        let w = ReplaceableWriter::new(move |_: &u8| -> io::Result<Option<(Spy, u8)>> {
            calls += 1;
            if calls == 1 {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            Ok(None)
        });

        let err = (&w).write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(Error::downcast(&err).is_none());
        assert!(!w.is_constructed());

        let err = (&w).write(b"x").unwrap_err();
        assert!(matches!(
            Error::downcast(&err),
            Some(Error::NotConstructed)
        ));
    }

    #[test]
    fn test_replaceable_writer_constructor_error_keeps_held_writer() -> io::Result<()> {
        let held = Spy::default();
        let mut plan = vec![
            Ok(Some(held.clone())),
            Err(io::Error::new(io::ErrorKind::Other, "unavailable")),
            Ok(None),
        ]
        .into_iter();
        let w = ReplaceableWriter::new(move |flag: &u32| -> io::Result<Option<(Spy, u32)>> {
            let next = plan.next().expect("constructor called more often than planned")?;
            Ok(next.map(|spy| (spy, flag + 1)))
        });

        (&w).write_all(b"one")?;

        let err = (&w).write(b"two").unwrap_err();
        assert_eq!(err.to_string(), "unavailable");
        assert!(w.is_constructed());
        assert_eq!(w.flag(), 1);
        assert_eq!(held.closes(), 0);

        (&w).write_all(b"three")?;
        assert_eq!(held.writes(), ["one", "three"]);
        assert_eq!(held.closes(), 0);
        Ok(())
    }

    #[test]
    fn test_replaceable_writer_swaps_under_concurrent_writes() {
        let even = Spy::default();
        let odd = Spy::default();
        let calls = AtomicUsize::new(0);
        let w = ReplaceableWriter::new(|flag: &u32| -> io::Result<Option<(Spy, u32)>> {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            if call % 10 != 0 {
                return Ok(None);
            }
            let spy = if (call / 10) % 2 == 0 { &even } else { &odd };
            Ok(Some((spy.clone(), flag + 1)))
        });

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..100 {
                        assert_eq!((&w).write(b"line\n").unwrap(), 5);
                    }
                });
            }
        });

        // 80 constructions, every one after the first closes its predecessor.
        assert_eq!(w.flag(), 80);
        assert_eq!(even.closes(), 40);
        assert_eq!(odd.closes(), 39);
        assert_eq!(even.writes().len() + odd.writes().len(), 800);
    }

    #[test]
    fn test_replaceable_writer_concurrent_writes() {
        let spy = Spy::default();
        let calls = AtomicUsize::new(0);
        let sink = spy.clone();
        let w = ReplaceableWriter::new(|flag: &bool| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(if *flag {
                None
            } else {
                Some((sink.clone(), true))
            })
        });

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..100 {
                        assert_eq!((&w).write(b"line\n").unwrap(), 5);
                    }
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 800);
        assert_eq!(spy.writes().len(), 800);
        assert_eq!(spy.closes(), 0);
        assert!(w.flag());
    }

    #[test]
    fn test_replaceable_writer_close() -> io::Result<()> {
        let first = Spy::default();
        let mut w = ReplaceableWriter::new(planned(vec![Some(first.clone())]));

        w.flush()?;
        w.close()?;
        assert_eq!(first.closes(), 0);

        w.write_all(b"x")?;
        w.flush()?;
        w.close()?;
        assert_eq!(first.closes(), 1);
        assert!(!w.is_constructed());
        assert_eq!(w.flag(), 1);

        w.close()?;
        assert_eq!(first.closes(), 1);
        Ok(())
    }
}
