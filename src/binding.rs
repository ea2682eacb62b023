//! Binding descriptors and the binding cache behind the object mapper.
//!
//! A type takes part in object mapping once it is registered as a container with a
//! [`Binder`]. Registration supplies a describe function that declares, field by field,
//! where each value lives:
//!
//! - [`Descriptor::value`] binds a field to a `(section, key)` pair with a default string;
//! - [`Descriptor::container`] marks a field as a nested container, whose own bindings are
//!   written to and read from the same document.
//!
//! The first time a type is mapped, its declared targets are turned into [`Bindings`]:
//! nested containers are derived recursively and value fields whose type has no
//! [`StringConverter`] are skipped. Derivation happens under one lock and at most once per
//! type, however many threads ask for it at the same time. A type that is still being
//! derived when it is reached again through a nested container counts as done, so cyclic
//! container graphs terminate.
//!
//! Registering a container or a converter later only discards the bindings that depend on
//! it: the re-registered type, types with a value field of the converted type, and every
//! container that nests one of those.
//!
//! ## Examples
//!
//! ```rust
//! use mini_ini::{Binder, Descriptor, IniContainer};
//!
//! #[derive(Default)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! impl IniContainer for Server {
//!     fn describe(d: &mut Descriptor<Self>) {
//!         d.value("Server", "host", "localhost", |s| &s.host, |s| &mut s.host)
//!             .value("Server", "port", "80", |s| &s.port, |s| &mut s.port);
//!     }
//! }
//!
//! let binder = Binder::new();
//! binder.register_container::<Server>();
//! let bindings = binder.bindings::<Server>().unwrap();
//! assert_eq!(bindings.len(), 2);
//! ```

use crate::convert::{FromStrConverter, Rfc3339Converter, StringConverter};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use num_bigint::BigInt;
use once_cell::sync::Lazy;
use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// A type whose fields can be mapped to and from an INI document.
pub trait IniContainer: Sized + 'static {
    /// Declares the bound fields of `Self`.
    fn describe(descriptor: &mut Descriptor<Self>);
}

/// Reaches one field of a container through `dyn Any`.
pub(crate) trait Accessor: Send + Sync {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any>;
    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Option<&'a mut dyn Any>;
}

struct FieldAccessor<T, F> {
    get: fn(&T) -> &F,
    get_mut: fn(&mut T) -> &mut F,
}

impl<T: Any, F: Any> Accessor for FieldAccessor<T, F> {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any> {
        let owner = owner.downcast_ref::<T>()?;
        Some((self.get)(owner) as &dyn Any)
    }

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        let owner = owner.downcast_mut::<T>()?;
        Some((self.get_mut)(owner) as &mut dyn Any)
    }
}

enum Target {
    Value {
        section: String,
        key: String,
        default: String,
        field_type: TypeId,
        field_type_name: &'static str,
        accessor: Arc<dyn Accessor>,
    },
    Container {
        field_type: TypeId,
        field_type_name: &'static str,
        accessor: Arc<dyn Accessor>,
    },
}

/// Collects the bound fields of `T` during registration.
pub struct Descriptor<T> {
    targets: Vec<Target>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Any> Descriptor<T> {
    fn new() -> Self {
        Descriptor {
            targets: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Binds a field to `key` in `section`. `default` is used when the document has no
    /// value, or an empty one.
    pub fn value<F: Any>(
        &mut self,
        section: &str,
        key: &str,
        default: &str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> &mut Self {
        self.targets.push(Target::Value {
            section: section.to_string(),
            key: key.to_string(),
            default: default.to_string(),
            field_type: TypeId::of::<F>(),
            field_type_name: type_name::<F>(),
            accessor: Arc::new(FieldAccessor { get, get_mut }),
        });
        self
    }

    /// Marks a field as a nested container. `C` must be registered with the same binder.
    pub fn container<C: Any>(
        &mut self,
        get: fn(&T) -> &C,
        get_mut: fn(&mut T) -> &mut C,
    ) -> &mut Self {
        self.targets.push(Target::Container {
            field_type: TypeId::of::<C>(),
            field_type_name: type_name::<C>(),
            accessor: Arc::new(FieldAccessor { get, get_mut }),
        });
        self
    }
}

pub(crate) enum Binding {
    Value {
        section: String,
        key: String,
        default: String,
        accessor: Arc<dyn Accessor>,
        converter: Arc<dyn StringConverter>,
    },
    Container {
        field_type: TypeId,
        field_type_name: &'static str,
        accessor: Arc<dyn Accessor>,
    },
}

/// The derived bindings of one container type.
pub struct Bindings {
    type_name: &'static str,
    targets: Vec<Binding>,
    // Value field types, bound or skipped, and nested container types.
    depends_on: HashSet<TypeId>,
}

impl Bindings {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Number of bound fields, values and nested containers together.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// The `(section, key)` pairs of the bound value fields, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.targets.iter().filter_map(|binding| match binding {
            Binding::Value { section, key, .. } => Some((section.as_str(), key.as_str())),
            Binding::Container { .. } => None,
        })
    }

    pub(crate) fn targets(&self) -> &[Binding] {
        &self.targets
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindings")
            .field("type_name", &self.type_name)
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

type Describe = Arc<dyn Fn() -> Vec<Target> + Send + Sync>;

#[derive(Default)]
struct BinderState {
    declarations: HashMap<TypeId, Describe>,
    converters: HashMap<TypeId, Arc<dyn StringConverter>>,
    derived: HashMap<TypeId, Arc<Bindings>>,
    processing: HashSet<TypeId>,
}

/// Registry of container declarations and string converters, plus the cache of derived
/// bindings.
///
/// All state sits behind a single mutex. [`Binder::global`] is the process-wide instance
/// used by [`IniSerializer::new`](crate::IniSerializer::new); independent instances can be
/// created with [`Binder::new`].
pub struct Binder {
    state: Mutex<BinderState>,
}

static GLOBAL: Lazy<Binder> = Lazy::new(Binder::new);

macro_rules! register_from_str {
    ($state:expr, $($ty:ty),* $(,)?) => {
        $(
            $state.converters.insert(
                TypeId::of::<$ty>(),
                Arc::new(FromStrConverter::<$ty>::new()) as Arc<dyn StringConverter>,
            );
        )*
    };
}

impl Binder {
    /// Creates a binder with the default converters and no containers.
    #[must_use]
    pub fn new() -> Self {
        let mut state = BinderState::default();
        register_from_str!(
            state, String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128,
            usize, f32, f64, BigInt, NaiveDate, IpAddr, SocketAddr,
        );
        state.converters.insert(
            TypeId::of::<DateTime<Utc>>(),
            Arc::new(Rfc3339Converter) as Arc<dyn StringConverter>,
        );
        Binder {
            state: Mutex::new(state),
        }
    }

    /// The process-wide binder.
    pub fn global() -> &'static Binder {
        &GLOBAL
    }

    fn lock(&self) -> MutexGuard<'_, BinderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `T` as a container described by `describe`.
    ///
    /// Registering a type again replaces its declaration and discards the bindings derived
    /// for it and for the containers nesting it.
    pub fn register<T, D>(&self, describe: D)
    where
        T: Any,
        D: Fn(&mut Descriptor<T>) + Send + Sync + 'static,
    {
        let describe: Describe = Arc::new(move || {
            let mut descriptor = Descriptor::<T>::new();
            describe(&mut descriptor);
            descriptor.targets
        });
        let mut state = self.lock();
        state.declarations.insert(TypeId::of::<T>(), describe);
        evict(&mut state, TypeId::of::<T>());
    }

    /// Registers `T` with its [`IniContainer::describe`].
    pub fn register_container<T: IniContainer>(&self) {
        self.register::<T, _>(T::describe);
    }

    /// Registers `converter` for values of type `T`, replacing any previous converter.
    ///
    /// Bindings with a value field of type `T`, and the containers nesting them, are
    /// derived again on next use.
    pub fn register_converter<T, C>(&self, converter: C)
    where
        T: Any,
        C: StringConverter + 'static,
    {
        let mut state = self.lock();
        state.converters.insert(TypeId::of::<T>(), Arc::new(converter));
        evict(&mut state, TypeId::of::<T>());
    }

    /// Returns `true` if `T` is registered as a container.
    #[must_use]
    pub fn is_registered<T: Any>(&self) -> bool {
        self.lock().declarations.contains_key(&TypeId::of::<T>())
    }

    /// Returns the bindings of `T`, deriving them on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] naming the type if `T`, or a container nested
    /// in it, is not registered.
    pub fn bindings<T: Any>(&self) -> Result<Arc<Bindings>> {
        self.bindings_by_id(TypeId::of::<T>(), type_name::<T>())
    }

    pub(crate) fn bindings_by_id(
        &self,
        type_id: TypeId,
        type_name: &'static str,
    ) -> Result<Arc<Bindings>> {
        let mut state = self.lock();
        derive(&mut state, type_id, type_name)?;
        state.derived.get(&type_id).cloned().ok_or_else(|| {
            Error::invalid_operation(&format!("bindings for `{}` are unavailable", type_name))
        })
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Binder")
            .field("containers", &state.declarations.len())
            .field("converters", &state.converters.len())
            .field("derived", &state.derived.len())
            .finish()
    }
}

fn derive(state: &mut BinderState, type_id: TypeId, type_name: &'static str) -> Result<()> {
    if state.derived.contains_key(&type_id) || state.processing.contains(&type_id) {
        return Ok(());
    }
    let describe = state.declarations.get(&type_id).cloned().ok_or_else(|| {
        Error::invalid_operation(&format!(
            "type `{}` is not registered as an INI container",
            type_name
        ))
    })?;

    state.processing.insert(type_id);
    let result = derive_targets(state, describe());
    state.processing.remove(&type_id);
    let (targets, depends_on) = result?;

    debug!(type_name, targets = targets.len(), "derived INI bindings");
    state.derived.insert(
        type_id,
        Arc::new(Bindings {
            type_name,
            targets,
            depends_on,
        }),
    );
    Ok(())
}

fn derive_targets(
    state: &mut BinderState,
    targets: Vec<Target>,
) -> Result<(Vec<Binding>, HashSet<TypeId>)> {
    let mut bindings = Vec::with_capacity(targets.len());
    let mut depends_on = HashSet::new();
    for target in targets {
        match target {
            Target::Value {
                section,
                key,
                default,
                field_type,
                field_type_name,
                accessor,
            } => {
                depends_on.insert(field_type);
                match state.converters.get(&field_type) {
                    Some(converter) => bindings.push(Binding::Value {
                        section,
                        key,
                        default,
                        accessor,
                        converter: Arc::clone(converter),
                    }),
                    None => trace!(
                        section = %section,
                        key = %key,
                        field_type = field_type_name,
                        "skipping field without a string converter"
                    ),
                }
            }
            Target::Container {
                field_type,
                field_type_name,
                accessor,
            } => {
                derive(state, field_type, field_type_name)?;
                depends_on.insert(field_type);
                bindings.push(Binding::Container {
                    field_type,
                    field_type_name,
                    accessor,
                });
            }
        }
    }
    Ok((bindings, depends_on))
}

/// Drops the derived bindings of `changed` and of every type that reaches it through a
/// value field or a nested container.
fn evict(state: &mut BinderState, changed: TypeId) {
    let mut stale = HashSet::from([changed]);
    loop {
        let dependents: Vec<TypeId> = state
            .derived
            .iter()
            .filter(|(id, bindings)| {
                !stale.contains(*id) && bindings.depends_on.iter().any(|dep| stale.contains(dep))
            })
            .map(|(id, _)| *id)
            .collect();
        if dependents.is_empty() {
            break;
        }
        stale.extend(dependents);
    }
    let before = state.derived.len();
    state.derived.retain(|id, _| !stale.contains(id));
    trace!(evicted = before - state.derived.len(), "discarded stale INI bindings");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Plain {
        name: String,
        size: u32,
        unsupported: Vec<u8>,
    }

    fn register_plain(binder: &Binder) {
        binder.register::<Plain, _>(|d| {
            d.value("Plain", "name", "", |p| &p.name, |p| &mut p.name)
                .value("Plain", "size", "1", |p| &p.size, |p| &mut p.size)
                .value("Plain", "bytes", "", |p| &p.unsupported, |p| &mut p.unsupported);
        });
    }

    #[test]
    fn test_unconvertible_fields_are_skipped() {
        let binder = Binder::new();
        register_plain(&binder);
        let bindings = binder.bindings::<Plain>().unwrap();
        let keys: Vec<_> = bindings.keys().collect();
        assert_eq!(keys, vec![("Plain", "name"), ("Plain", "size")]);
    }

    #[test]
    fn test_unregistered_type_is_named() {
        let binder = Binder::new();
        let err = binder.bindings::<Plain>().unwrap_err();
        match err {
            Error::InvalidOperation(msg) => assert!(msg.contains("Plain")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_custom_converter_enables_field() {
        struct BytesConverter;
        impl StringConverter for BytesConverter {
            fn type_name(&self) -> &'static str {
                "Vec<u8>"
            }
            fn to_ini(&self, value: &dyn Any) -> Option<String> {
                value
                    .downcast_ref::<Vec<u8>>()
                    .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            }
            fn from_ini(&self, text: &str, target: &mut dyn Any) -> std::result::Result<(), String> {
                let slot = target.downcast_mut::<Vec<u8>>().ok_or("not bytes")?;
                *slot = text.as_bytes().to_vec();
                Ok(())
            }
        }

        let binder = Binder::new();
        register_plain(&binder);
        assert_eq!(binder.bindings::<Plain>().unwrap().len(), 2);

        binder.register_converter::<Vec<u8>, _>(BytesConverter);
        assert_eq!(binder.bindings::<Plain>().unwrap().len(), 3);
    }

    #[test]
    fn test_derivation_is_cached() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let binder = Binder::new();
        binder.register::<Plain, _>(|d| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            d.value("Plain", "name", "", |p| &p.name, |p| &mut p.name);
        });

        let first = binder.bindings::<Plain>().unwrap();
        let second = binder.bindings::<Plain>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    struct Ping {
        label: String,
        pong: Box<Pong>,
    }

    struct Pong {
        ping: Box<Ping>,
    }

    #[test]
    fn test_cyclic_containers_terminate() {
        let binder = Binder::new();
        binder.register::<Ping, _>(|d| {
            d.value("Ping", "label", "", |p| &p.label, |p| &mut p.label)
                .container(|p| &*p.pong, |p| &mut *p.pong);
        });
        binder.register::<Pong, _>(|d| {
            d.container(|p| &*p.ping, |p| &mut *p.ping);
        });

        assert_eq!(binder.bindings::<Ping>().unwrap().len(), 2);
        assert_eq!(binder.bindings::<Pong>().unwrap().len(), 1);
    }

    #[derive(Default)]
    struct Outer {
        inner: Plain,
    }

    fn register_outer(binder: &Binder) {
        binder.register::<Outer, _>(|d| {
            d.container(|o| &o.inner, |o| &mut o.inner);
        });
    }

    #[derive(Default)]
    struct Unrelated {
        flag: bool,
    }

    #[test]
    fn test_unrelated_registration_keeps_cache() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let binder = Binder::new();
        binder.register::<Plain, _>(|d| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            d.value("Plain", "name", "", |p| &p.name, |p| &mut p.name);
        });
        let first = binder.bindings::<Plain>().unwrap();

        binder.register::<Unrelated, _>(|d| {
            d.value("Unrelated", "flag", "false", |u| &u.flag, |u| &mut u.flag);
        });
        binder.bindings::<Unrelated>().unwrap();
        binder.register_converter::<Vec<u16>, _>(FromStrConverter::<u16>::new());

        let second = binder.bindings::<Plain>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reregistration_evicts_type_and_parents() {
        let binder = Binder::new();
        register_plain(&binder);
        register_outer(&binder);
        binder.register::<Unrelated, _>(|d| {
            d.value("Unrelated", "flag", "false", |u| &u.flag, |u| &mut u.flag);
        });
        let plain = binder.bindings::<Plain>().unwrap();
        let outer = binder.bindings::<Outer>().unwrap();
        let unrelated = binder.bindings::<Unrelated>().unwrap();

        register_plain(&binder);
        assert!(!Arc::ptr_eq(&plain, &binder.bindings::<Plain>().unwrap()));
        assert!(!Arc::ptr_eq(&outer, &binder.bindings::<Outer>().unwrap()));
        assert!(Arc::ptr_eq(&unrelated, &binder.bindings::<Unrelated>().unwrap()));
    }

    #[test]
    fn test_converter_registration_evicts_users_and_parents() {
        let binder = Binder::new();
        register_plain(&binder);
        register_outer(&binder);
        let outer = binder.bindings::<Outer>().unwrap();
        assert_eq!(binder.bindings::<Plain>().unwrap().len(), 2);

        // Plain has a skipped Vec<u8> field; a converter for it must be picked up.
        binder.register_converter::<Vec<u8>, _>(FromStrConverter::<u8>::new());
        assert_eq!(binder.bindings::<Plain>().unwrap().len(), 3);
        assert!(!Arc::ptr_eq(&outer, &binder.bindings::<Outer>().unwrap()));
    }

    #[test]
    fn test_nested_unregistered_container_fails() {
        let binder = Binder::new();
        register_outer(&binder);
        assert!(matches!(
            binder.bindings::<Outer>(),
            Err(Error::InvalidOperation(_))
        ));
        assert!(binder.lock().processing.is_empty());

        register_plain(&binder);
        assert_eq!(binder.bindings::<Outer>().unwrap().len(), 1);
    }
}
