// Class table
// Per-class method tables consulted by the dispatcher; bindings are written
// here once at startup and only read afterwards

use super::caller::{NativeMethod, UncheckedMethod};
use super::value::{Value, PRIMITIVE_CLASSES};
use crate::error::BindError;
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(pub(crate) usize);

/// Identity of one class table; objects remember the table they were made in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TableTag(pub(crate) usize);

static NEXT_TABLE: AtomicUsize = AtomicUsize::new(1);

/// Native receiver type declared by a class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeType {
    pub name: &'static str,
    pub id: TypeId,
}

impl NativeType {
    pub fn of<T: Any>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }
}

/// One generated binding ready to install, as emitted into `BINDINGS`.
///
/// The install interface only accepts this record, which pairs the
/// trampoline with the receiver type it downcasts to. Building one is
/// `unsafe`, so a mismatched pairing cannot be made from safe code:
///
/// ```compile_fail
/// use sald_bind::builtins::{generated, ListBox};
/// use sald_bind::vm::Installation;
///
/// let forged = Installation::new(
///     "List",
///     "==",
///     "ListBox",
///     std::any::TypeId::of::<ListBox>,
///     "NumberBox_equals_binding",
///     1,
///     generated::NumberBox_equals_binding,
/// );
/// ```
///
/// The fields are private too:
///
/// ```compile_fail
/// use sald_bind::vm::Installation;
///
/// let mut installation = sald_bind::builtins::BINDINGS[0];
/// installation.class_name = "List";
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Installation {
    class_name: &'static str,
    method_name: &'static str,
    native_type: &'static str,
    type_id: fn() -> TypeId,
    symbol: &'static str,
    arity: usize,
    func: UncheckedMethod,
}

impl Installation {
    /// # Safety
    ///
    /// `func` may only downcast its receiver to the type whose id `type_id`
    /// returns, and must not assume anything else about the receiver.
    #[doc(hidden)]
    pub const unsafe fn new(
        class_name: &'static str,
        method_name: &'static str,
        native_type: &'static str,
        type_id: fn() -> TypeId,
        symbol: &'static str,
        arity: usize,
        func: UncheckedMethod,
    ) -> Self {
        Self {
            class_name,
            method_name,
            native_type,
            type_id,
            symbol,
            arity,
            func,
        }
    }

    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    pub fn method_name(&self) -> &'static str {
        self.method_name
    }

    pub fn native_type(&self) -> &'static str {
        self.native_type
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn arity(&self) -> usize {
        self.arity
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Method {
    pub(super) func: UncheckedMethod,
    arity: usize,
    symbol: Option<&'static str>,
}

impl Method {
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Generated trampoline symbol, `None` for hand-written natives
    pub fn symbol(&self) -> Option<&'static str> {
        self.symbol
    }
}

#[derive(Debug, Clone)]
pub struct Class {
    pub name: String,
    pub superclass: Option<ClassId>,
    pub native_type: Option<NativeType>,
    methods: FxHashMap<String, Method>,
}

impl Class {
    fn new(name: impl Into<String>, superclass: Option<ClassId>, native_type: Option<NativeType>) -> Self {
        Self {
            name: name.into(),
            superclass,
            native_type,
            methods: FxHashMap::default(),
        }
    }

    /// Method defined on this class itself, ignoring ancestors
    pub fn own_method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }
}

#[derive(Debug)]
pub struct ClassTable {
    tag: TableTag,
    classes: Vec<Class>,
    by_name: FxHashMap<String, ClassId>,
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassTable {
    pub fn new() -> Self {
        Self {
            tag: TableTag(NEXT_TABLE.fetch_add(1, Ordering::Relaxed)),
            classes: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    pub(crate) fn tag(&self) -> TableTag {
        self.tag
    }

    /// Define a class. A subclass inherits its superclass's native type and
    /// may not declare a different one, so every object reaching an inherited
    /// trampoline carries the payload that trampoline expects.
    pub fn define_class(
        &mut self,
        name: &str,
        superclass: Option<&str>,
        native_type: Option<NativeType>,
    ) -> Result<ClassId, BindError> {
        if self.by_name.contains_key(name) {
            return Err(BindError::DuplicateClass {
                class: name.to_string(),
            });
        }

        let (superclass, native_type) = match superclass {
            Some(parent_name) => {
                let parent_id = self.lookup(parent_name).ok_or_else(|| BindError::UndefinedClass {
                    class: parent_name.to_string(),
                })?;
                let inherited = self.class(parent_id).native_type;
                let native_type = match (inherited, native_type) {
                    (Some(parent), Some(own)) if parent.id != own.id => {
                        return Err(BindError::SuperclassTypeMismatch {
                            class: name.to_string(),
                            superclass: parent_name.to_string(),
                        });
                    }
                    (Some(parent), _) => Some(parent),
                    (None, own) => own,
                };
                (Some(parent_id), native_type)
            }
            None => (None, native_type),
        };

        // immediate values have no payload to downcast
        if native_type.is_some() && PRIMITIVE_CLASSES.contains(&name) {
            return Err(BindError::PrimitiveNativeType {
                class: name.to_string(),
            });
        }

        let id = ClassId(self.classes.len());
        self.classes.push(Class::new(name, superclass, native_type));
        self.by_name.insert(name.to_string(), id);
        tracing::trace!(class = name, "defined class");
        Ok(id)
    }

    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.0]
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Install a generated binding on the named class's own method table.
    ///
    /// Overwrites an existing entry of the same name; subclasses and
    /// ancestors are never touched.
    pub fn install(&mut self, installation: &Installation) -> Result<(), BindError> {
        let id = self
            .lookup(installation.class_name)
            .ok_or_else(|| BindError::UndefinedClass {
                class: installation.class_name.to_string(),
            })?;

        let class = &mut self.classes[id.0];
        let expected = (installation.type_id)();
        if class.native_type.map(|t| t.id) != Some(expected) {
            return Err(BindError::NativeTypeMismatch {
                class: installation.class_name.to_string(),
                method: installation.method_name.to_string(),
                native_type: installation.native_type.to_string(),
            });
        }

        let method = Method {
            func: installation.func,
            arity: installation.arity,
            symbol: Some(installation.symbol),
        };
        if let Some(previous) = class
            .methods
            .insert(installation.method_name.to_string(), method)
        {
            tracing::debug!(
                class = installation.class_name,
                method = installation.method_name,
                previous = previous.symbol.unwrap_or("<native>"),
                symbol = installation.symbol,
                "binding overrides existing method"
            );
        } else {
            tracing::trace!(
                class = installation.class_name,
                method = installation.method_name,
                symbol = installation.symbol,
                "installed binding"
            );
        }
        Ok(())
    }

    /// Define a hand-written native method. It must check its own arity and
    /// may not assume any receiver type.
    pub fn define_native(
        &mut self,
        class_name: &str,
        method_name: &str,
        arity: usize,
        func: NativeMethod,
    ) -> Result<(), BindError> {
        let id = self
            .lookup(class_name)
            .ok_or_else(|| BindError::UndefinedClass {
                class: class_name.to_string(),
            })?;
        self.classes[id.0].methods.insert(
            method_name.to_string(),
            Method {
                func,
                arity,
                symbol: None,
            },
        );
        Ok(())
    }

    /// Find a method on the class or its ancestors
    pub fn find_method(&self, class: ClassId, name: &str) -> Option<&Method> {
        let mut current = Some(class);
        while let Some(id) = current {
            let class = self.class(id);
            if let Some(method) = class.own_method(name) {
                return Some(method);
            }
            current = class.superclass;
        }
        None
    }

    /// Class used to dispatch on `value`. Objects made from another table
    /// have no class here.
    pub fn class_of(&self, value: &Value) -> Option<ClassId> {
        match value {
            Value::Object(obj) if obj.table == self.tag => Some(obj.class),
            Value::Object(_) => None,
            other => self.lookup(other.type_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use crate::vm::env::Env;
    use crate::vm::value::Block;

    struct ProbeBox;
    struct OtherBox;

    fn first(_: &mut Env, _: &Value, _: &[Value], _: Option<&Block>) -> Result<Value, RuntimeError> {
        Ok(Value::Integer(1))
    }

    fn second(_: &mut Env, _: &Value, _: &[Value], _: Option<&Block>) -> Result<Value, RuntimeError> {
        Ok(Value::Integer(2))
    }

    fn installation(class_name: &'static str, symbol: &'static str, func: NativeMethod) -> Installation {
        // SAFETY: the test natives never look at their receiver
        unsafe {
            Installation::new(
                class_name,
                "foo",
                "ProbeBox",
                TypeId::of::<ProbeBox>,
                symbol,
                0,
                func,
            )
        }
    }

    fn table() -> ClassTable {
        let mut classes = ClassTable::new();
        classes.define_class("Object", None, None).unwrap();
        classes
            .define_class("Base", Some("Object"), Some(NativeType::of::<ProbeBox>()))
            .unwrap();
        classes.define_class("ClassA", Some("Base"), None).unwrap();
        classes.define_class("ClassB", Some("ClassA"), None).unwrap();
        classes
    }

    fn call(classes: &ClassTable, class: &str, name: &str) -> Option<i64> {
        let id = classes.lookup(class)?;
        let method = classes.find_method(id, name)?;
        let mut env = Env::new(std::rc::Rc::new(ClassTable::new()));
        // SAFETY: the test natives never look at their receiver
        unsafe { (method.func)(&mut env, &Value::Nil, &[], None) }
            .ok()?
            .as_integer()
    }

    #[test]
    fn test_later_installation_wins() {
        let mut classes = table();
        classes
            .install(&installation("ClassA", "ProbeBox_first_binding", first))
            .unwrap();
        classes
            .install(&installation("ClassA", "ProbeBox_second_binding", second))
            .unwrap();

        let a = classes.class(classes.lookup("ClassA").unwrap());
        assert_eq!(
            a.own_method("foo").and_then(|m| m.symbol()),
            Some("ProbeBox_second_binding")
        );
        assert_eq!(call(&classes, "ClassA", "foo"), Some(2));
    }

    #[test]
    fn test_install_only_touches_own_table() {
        let mut classes = table();
        classes
            .install(&installation("ClassA", "ProbeBox_first_binding", first))
            .unwrap();

        for ancestor in ["Object", "Base"] {
            let class = classes.class(classes.lookup(ancestor).unwrap());
            assert!(class.own_method("foo").is_none(), "{} was modified", ancestor);
        }
        let b = classes.class(classes.lookup("ClassB").unwrap());
        assert!(b.own_method("foo").is_none());
        // still reachable from the subclass through dispatch
        assert_eq!(call(&classes, "ClassB", "foo"), Some(1));
        assert_eq!(call(&classes, "Base", "foo"), None);
    }

    #[test]
    fn test_undefined_class_is_rejected() {
        let mut classes = table();
        let err = classes
            .install(&installation("Missing", "ProbeBox_first_binding", first))
            .unwrap_err();
        assert_eq!(
            err,
            BindError::UndefinedClass {
                class: "Missing".to_string()
            }
        );
    }

    #[test]
    fn test_receiver_type_must_match_class() {
        let mut classes = table();
        let err = classes
            .install(&installation("Object", "ProbeBox_first_binding", first))
            .unwrap_err();
        assert!(matches!(err, BindError::NativeTypeMismatch { .. }));

        let mut wrong = installation("ClassA", "OtherBox_first_binding", first);
        wrong.type_id = TypeId::of::<OtherBox>;
        assert!(matches!(
            classes.install(&wrong),
            Err(BindError::NativeTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_subclass_native_type_rules() {
        let mut classes = table();
        let inherited = classes.lookup("ClassB").unwrap();
        assert_eq!(
            classes.class(inherited).native_type.map(|t| t.id),
            Some(TypeId::of::<ProbeBox>())
        );

        let err = classes
            .define_class("Broken", Some("Base"), Some(NativeType::of::<OtherBox>()))
            .unwrap_err();
        assert!(matches!(err, BindError::SuperclassTypeMismatch { .. }));

        assert!(matches!(
            classes.define_class("Base", None, None),
            Err(BindError::DuplicateClass { .. })
        ));
    }

    #[test]
    fn test_primitive_classes_have_no_native_type() {
        let mut classes = table();
        assert_eq!(
            classes.define_class("Integer", Some("Object"), Some(NativeType::of::<ProbeBox>())),
            Err(BindError::PrimitiveNativeType {
                class: "Integer".to_string()
            })
        );
        // inheriting one is rejected as well
        assert!(matches!(
            classes.define_class("String", Some("Base"), None),
            Err(BindError::PrimitiveNativeType { .. })
        ));
        assert!(classes.define_class("Integer", Some("Object"), None).is_ok());
        assert!(matches!(
            classes.install(&installation("Integer", "ProbeBox_first_binding", first)),
            Err(BindError::NativeTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_objects_from_another_table_have_no_class() {
        let classes = table();
        let other = table();
        let env = Env::new(std::rc::Rc::new(table()));
        let object = env.new_object("Base", ProbeBox).unwrap();

        assert_eq!(classes.class_of(&object), None);
        assert_eq!(other.class_of(&object), None);
        assert_eq!(env.classes().class_of(&object), classes.lookup("Base"));
        assert_eq!(classes.class_of(&Value::Nil), None);
    }

    #[test]
    fn test_define_native_and_lookup_through_ancestors() {
        let mut classes = table();
        classes.define_native("Object", "foo", 0, second).unwrap();
        let object = classes.class(classes.lookup("Object").unwrap());
        assert_eq!(object.own_method("foo").map(|m| m.symbol()), Some(None));
        assert_eq!(call(&classes, "ClassB", "foo"), Some(2));
        assert_eq!(call(&classes, "ClassB", "bar"), None);
    }
}
