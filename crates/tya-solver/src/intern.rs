//! Type interning for structural deduplication.
//!
//! Converts `TypeData` structures into lightweight `TypeId` handles.
//!
//! Benefits:
//! - O(1) type equality (just compare TypeId values)
//! - Memory efficient (each unique structure stored once)
//! - Per-type classification flags computed once, at intern time
//!
//! Union invariants are enforced here: [`TypeInterner::union`] flattens
//! nested unions, drops `never` members, deduplicates while preserving
//! first-occurrence order, and collapses empty/singleton results.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use tya_common::interner::{Atom, ShardedInterner};

use crate::types::*;

const TYPE_LIST_INLINE: usize = 8;

/// Upper bound on the number of literal combinations a template literal is
/// allowed to expand into. Past this, the template stays unexpanded.
pub const TEMPLATE_LITERAL_EXPANSION_LIMIT: usize = 10_000;

type TypeListBuffer = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

struct TypeTable {
    key_to_id: FxHashMap<TypeData, TypeId>,
    id_to_key: Vec<TypeData>,
    flags: Vec<TypeFlags>,
}

impl TypeTable {
    fn new() -> Self {
        TypeTable {
            key_to_id: FxHashMap::default(),
            id_to_key: Vec::new(),
            flags: Vec::new(),
        }
    }
}

struct SliceInterner<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T> SliceInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: Vec<T>) -> u32 {
        if items.is_empty() {
            return 0;
        }

        if let Some(&id) = self.map.get(items.as_slice()) {
            return id;
        }

        let arc: Arc<[T]> = items.into();
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<[T]>> {
        self.items.get(id as usize).cloned()
    }

    fn empty(&self) -> Arc<[T]> {
        self.items[0].clone()
    }
}

struct ValueInterner<T> {
    items: Vec<Arc<T>>,
    map: FxHashMap<Arc<T>, u32>,
}

impl<T> ValueInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        ValueInterner {
            items: Vec::new(),
            map: FxHashMap::default(),
        }
    }

    fn intern(&mut self, value: T) -> u32 {
        if let Some(&id) = self.map.get(&value) {
            return id;
        }

        let arc = Arc::new(value);
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<T>> {
        self.items.get(id as usize).cloned()
    }
}

/// Type interning table.
/// Thread-safe via RwLock for concurrent access.
pub struct TypeInterner {
    /// String interner for variable names, object keys, and string literals.
    pub string_interner: ShardedInterner,
    types: RwLock<TypeTable>,
    type_lists: RwLock<SliceInterner<TypeId>>,
    tuple_lists: RwLock<SliceInterner<TupleElement>>,
    template_lists: RwLock<SliceInterner<TemplateSpan>>,
    object_shapes: RwLock<ValueInterner<ObjectShape>>,
    function_shapes: RwLock<ValueInterner<FunctionShape>>,
    conditional_types: RwLock<ValueInterner<ConditionalType>>,
    mapped_types: RwLock<ValueInterner<MappedType>>,
    applications: RwLock<ValueInterner<TypeApplication>>,
}

impl TypeInterner {
    /// Create a new type interner with the reserved intrinsics pre-registered
    /// so that the `TypeId` constants line up with table slots.
    pub fn new() -> Self {
        let interner = TypeInterner {
            string_interner: {
                let interner = ShardedInterner::new();
                interner.intern_common();
                interner
            },
            types: RwLock::new(TypeTable::new()),
            type_lists: RwLock::new(SliceInterner::new()),
            tuple_lists: RwLock::new(SliceInterner::new()),
            template_lists: RwLock::new(SliceInterner::new()),
            object_shapes: RwLock::new(ValueInterner::new()),
            function_shapes: RwLock::new(ValueInterner::new()),
            conditional_types: RwLock::new(ValueInterner::new()),
            mapped_types: RwLock::new(ValueInterner::new()),
            applications: RwLock::new(ValueInterner::new()),
        };

        let reserved = [
            TypeData::Intrinsic(IntrinsicKind::Any),
            TypeData::Intrinsic(IntrinsicKind::Unknown),
            TypeData::Intrinsic(IntrinsicKind::Never),
            TypeData::Intrinsic(IntrinsicKind::String),
            TypeData::Intrinsic(IntrinsicKind::Number),
            TypeData::Intrinsic(IntrinsicKind::Boolean),
            TypeData::Intrinsic(IntrinsicKind::Symbol),
            TypeData::Intrinsic(IntrinsicKind::Null),
            TypeData::Intrinsic(IntrinsicKind::Undefined),
            TypeData::Intrinsic(IntrinsicKind::Void),
            TypeData::Literal(LiteralValue::Boolean(true)),
            TypeData::Literal(LiteralValue::Boolean(false)),
        ];
        for key in reserved {
            interner.intern(key);
        }
        debug_assert_eq!(
            interner.types.read().map(|t| t.id_to_key.len()).unwrap_or(0),
            TypeId::RESERVED as usize
        );

        interner
    }

    /// Intern a string into an Atom.
    pub fn intern_string(&self, s: &str) -> Atom {
        self.string_interner.intern(s)
    }

    /// Resolve an Atom back to its string value.
    pub fn resolve_atom(&self, atom: Atom) -> String {
        self.string_interner.resolve(atom).to_string()
    }

    /// Resolve an Atom without allocating a new String.
    pub fn resolve_atom_ref(&self, atom: Atom) -> Arc<str> {
        self.string_interner.resolve(atom)
    }

    /// Intern a `TypeData` structure, returning its id.
    ///
    /// Union values should be built through [`union`](Self::union), which
    /// maintains the flattening and deduplication invariants; everything else
    /// may be interned directly.
    pub fn intern(&self, key: TypeData) -> TypeId {
        if let Ok(table) = self.types.read()
            && let Some(&id) = table.key_to_id.get(&key)
        {
            return id;
        }

        let flags = self.compute_flags(&key);

        let Ok(mut table) = self.types.write() else {
            return TypeId::NEVER;
        };
        // Re-check under the write lock: another thread may have interned
        // the same key between our read and write.
        if let Some(&id) = table.key_to_id.get(&key) {
            return id;
        }
        let id = TypeId(table.id_to_key.len() as u32);
        table.id_to_key.push(key.clone());
        table.flags.push(flags);
        table.key_to_id.insert(key, id);
        id
    }

    /// Look up the structure behind an id.
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        let table = self.types.read().ok()?;
        table.id_to_key.get(id.0 as usize).cloned()
    }

    /// Classification flags for an id (empty for unknown ids).
    pub fn flags_of(&self, id: TypeId) -> TypeFlags {
        self.types
            .read()
            .ok()
            .and_then(|table| table.flags.get(id.0 as usize).copied())
            .unwrap_or_default()
    }

    // =========================================================================
    // Side-table accessors
    // =========================================================================

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        let lists = self.type_lists.read().expect("type_lists lock poisoned");
        lists.get(id.0).unwrap_or_else(|| lists.empty())
    }

    pub fn tuple_list(&self, id: TupleListId) -> Arc<[TupleElement]> {
        let lists = self.tuple_lists.read().expect("tuple_lists lock poisoned");
        lists.get(id.0).unwrap_or_else(|| lists.empty())
    }

    pub fn template_list(&self, id: TemplateListId) -> Arc<[TemplateSpan]> {
        let lists = self
            .template_lists
            .read()
            .expect("template_lists lock poisoned");
        lists.get(id.0).unwrap_or_else(|| lists.empty())
    }

    pub fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape> {
        self.object_shapes
            .read()
            .expect("object_shapes lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| {
                Arc::new(ObjectShape {
                    properties: Vec::new(),
                })
            })
    }

    pub fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        self.function_shapes
            .read()
            .expect("function_shapes lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| {
                Arc::new(FunctionShape {
                    this_type: None,
                    params: Vec::new(),
                    return_type: TypeId::UNKNOWN,
                    is_constructor: false,
                })
            })
    }

    pub fn conditional_type(&self, id: ConditionalTypeId) -> Arc<ConditionalType> {
        self.conditional_types
            .read()
            .expect("conditional_types lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| {
                Arc::new(ConditionalType {
                    check_type: TypeId::NEVER,
                    extends_type: TypeId::NEVER,
                    true_type: TypeId::NEVER,
                    false_type: TypeId::NEVER,
                    is_distributive: false,
                })
            })
    }

    pub fn mapped_type(&self, id: MappedTypeId) -> Arc<MappedType> {
        self.mapped_types
            .read()
            .expect("mapped_types lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| {
                Arc::new(MappedType {
                    type_param: TypeParamInfo::named(Atom::NONE),
                    constraint: TypeId::NEVER,
                    name_type: None,
                    template: TypeId::NEVER,
                    optional_modifier: None,
                    readonly_modifier: None,
                })
            })
    }

    pub fn type_application(&self, id: TypeApplicationId) -> Arc<TypeApplication> {
        self.applications
            .read()
            .expect("applications lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| {
                Arc::new(TypeApplication {
                    base: TypeId::NEVER,
                    args: Vec::new(),
                })
            })
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    /// Intern a string literal type.
    pub fn literal_string(&self, value: &str) -> TypeId {
        let atom = self.intern_string(value);
        self.intern(TypeData::Literal(LiteralValue::String(atom)))
    }

    /// Intern a number literal type.
    pub fn literal_number(&self, value: f64) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Number(OrderedFloat(value))))
    }

    /// Intern a boolean literal type (always one of the reserved ids).
    pub fn literal_boolean(&self, value: bool) -> TypeId {
        if value {
            TypeId::BOOLEAN_TRUE
        } else {
            TypeId::BOOLEAN_FALSE
        }
    }

    /// Build a union, maintaining the union invariants:
    ///
    /// - nested unions are flattened (a union never contains a union),
    /// - `never` members are dropped,
    /// - `any` / `unknown` absorb the whole union,
    /// - duplicates collapse, first-occurrence order is preserved,
    /// - empty unions collapse to `never`, singletons to the member.
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat = TypeListBuffer::new();
        let mut seen = FxHashSet::default();

        for member in members {
            if member.is_any() {
                return TypeId::ANY;
            }
            if member.is_unknown() {
                return TypeId::UNKNOWN;
            }
            if member.is_never() {
                continue;
            }
            if let Some(TypeData::Union(list_id)) = self.lookup(member) {
                for &inner in self.type_list(list_id).iter() {
                    if seen.insert(inner) {
                        flat.push(inner);
                    }
                }
            } else if seen.insert(member) {
                flat.push(member);
            }
        }

        match flat.len() {
            0 => TypeId::NEVER,
            1 => flat[0],
            _ => {
                let list_id = {
                    let mut lists = self.type_lists.write().expect("type_lists lock poisoned");
                    TypeListId(lists.intern(flat.into_vec()))
                };
                self.intern(TypeData::Union(list_id))
            }
        }
    }

    /// Two-member union shorthand.
    pub fn union2(&self, a: TypeId, b: TypeId) -> TypeId {
        self.union(vec![a, b])
    }

    /// Intern a tuple type.
    pub fn tuple(&self, elements: Vec<TupleElement>) -> TypeId {
        let list_id = {
            let mut lists = self.tuple_lists.write().expect("tuple_lists lock poisoned");
            TupleListId(lists.intern(elements))
        };
        self.intern(TypeData::Tuple(list_id))
    }

    /// Intern an object type. Field names must be unique; field order is
    /// preserved and observable.
    pub fn object(&self, properties: Vec<PropertyInfo>) -> TypeId {
        debug_assert!(
            {
                let mut names = FxHashSet::default();
                properties.iter().all(|prop| names.insert(prop.name))
            },
            "object field names must be unique"
        );
        let shape_id = {
            let mut shapes = self
                .object_shapes
                .write()
                .expect("object_shapes lock poisoned");
            ObjectShapeId(shapes.intern(ObjectShape { properties }))
        };
        self.intern(TypeData::Object(shape_id))
    }

    /// Intern a function (or constructor) type.
    pub fn function(&self, shape: FunctionShape) -> TypeId {
        let shape_id = {
            let mut shapes = self
                .function_shapes
                .write()
                .expect("function_shapes lock poisoned");
            FunctionShapeId(shapes.intern(shape))
        };
        self.intern(TypeData::Function(shape_id))
    }

    /// Intern a conditional type.
    pub fn conditional(&self, cond: ConditionalType) -> TypeId {
        let cond_id = {
            let mut conds = self
                .conditional_types
                .write()
                .expect("conditional_types lock poisoned");
            ConditionalTypeId(conds.intern(cond))
        };
        self.intern(TypeData::Conditional(cond_id))
    }

    /// Intern a mapped type.
    pub fn mapped(&self, mapped: MappedType) -> TypeId {
        let mapped_id = {
            let mut mappeds = self
                .mapped_types
                .write()
                .expect("mapped_types lock poisoned");
            MappedTypeId(mappeds.intern(mapped))
        };
        self.intern(TypeData::Mapped(mapped_id))
    }

    /// Intern a template literal type from its spans.
    pub fn template_literal(&self, spans: Vec<TemplateSpan>) -> TypeId {
        let list_id = {
            let mut lists = self
                .template_lists
                .write()
                .expect("template_lists lock poisoned");
            TemplateListId(lists.intern(spans))
        };
        self.intern(TypeData::TemplateLiteral(list_id))
    }

    /// Intern a `keyof` query.
    pub fn keyof(&self, operand: TypeId) -> TypeId {
        self.intern(TypeData::KeyOf(operand))
    }

    /// Intern an indexed access `object[index]`.
    pub fn index_access(&self, object: TypeId, index: TypeId) -> TypeId {
        self.intern(TypeData::IndexAccess(object, index))
    }

    /// Intern a named type variable.
    pub fn type_parameter(&self, name: Atom) -> TypeId {
        self.intern(TypeData::TypeParameter(TypeParamInfo::named(name)))
    }

    /// Intern an infer variable.
    pub fn infer(&self, name: Atom) -> TypeId {
        self.intern(TypeData::Infer(TypeParamInfo::named(name)))
    }

    /// Intern a string case-transform intrinsic.
    pub fn string_intrinsic(&self, kind: StringIntrinsicKind, type_arg: TypeId) -> TypeId {
        self.intern(TypeData::StringIntrinsic { kind, type_arg })
    }

    /// Intern a generic application `base<args...>`.
    pub fn application(&self, base: TypeId, args: Vec<TypeId>) -> TypeId {
        let app_id = {
            let mut apps = self
                .applications
                .write()
                .expect("applications lock poisoned");
            TypeApplicationId(apps.intern(TypeApplication { base, args }))
        };
        self.intern(TypeData::Application(app_id))
    }

    // =========================================================================
    // Flag computation
    // =========================================================================

    fn compute_flags(&self, key: &TypeData) -> TypeFlags {
        match key {
            TypeData::Intrinsic(_) | TypeData::Literal(_) => TypeFlags::empty(),
            TypeData::TypeParameter(info) => {
                TypeFlags::CONTAINS_TYPE_PARAMETER | self.param_info_flags(info)
            }
            TypeData::Infer(info) => TypeFlags::CONTAINS_INFER | self.param_info_flags(info),
            TypeData::Union(list_id) => self
                .type_list(*list_id)
                .iter()
                .fold(TypeFlags::empty(), |acc, &member| {
                    acc | self.flags_of(member)
                }),
            TypeData::Tuple(list_id) => self
                .tuple_list(*list_id)
                .iter()
                .fold(TypeFlags::empty(), |acc, elem| {
                    acc | self.flags_of(elem.type_id)
                }),
            TypeData::Object(shape_id) => self
                .object_shape(*shape_id)
                .properties
                .iter()
                .fold(TypeFlags::empty(), |acc, prop| {
                    acc | self.flags_of(prop.type_id)
                }),
            TypeData::Function(shape_id) => {
                let shape = self.function_shape(*shape_id);
                let mut flags = self.flags_of(shape.return_type);
                if let Some(this_type) = shape.this_type {
                    flags |= self.flags_of(this_type);
                }
                for param in &shape.params {
                    flags |= self.flags_of(param.type_id);
                }
                flags
            }
            TypeData::Conditional(cond_id) => {
                let cond = self.conditional_type(*cond_id);
                TypeFlags::CONTAINS_DEFERRED
                    | self.flags_of(cond.check_type)
                    | self.flags_of(cond.extends_type)
                    | self.flags_of(cond.true_type)
                    | self.flags_of(cond.false_type)
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = self.mapped_type(*mapped_id);
                let mut flags = TypeFlags::CONTAINS_DEFERRED
                    | self.flags_of(mapped.constraint)
                    | self.flags_of(mapped.template);
                if let Some(name_type) = mapped.name_type {
                    flags |= self.flags_of(name_type);
                }
                flags
            }
            TypeData::TemplateLiteral(list_id) => {
                let mut flags = TypeFlags::CONTAINS_DEFERRED;
                for span in self.template_list(*list_id).iter() {
                    if let TemplateSpan::Type(inner) = span {
                        flags |= self.flags_of(*inner);
                    }
                }
                flags
            }
            TypeData::KeyOf(operand) => TypeFlags::CONTAINS_DEFERRED | self.flags_of(*operand),
            TypeData::IndexAccess(object, index) => {
                TypeFlags::CONTAINS_DEFERRED | self.flags_of(*object) | self.flags_of(*index)
            }
            TypeData::StringIntrinsic { type_arg, .. } => {
                TypeFlags::CONTAINS_DEFERRED | self.flags_of(*type_arg)
            }
            TypeData::Lazy(_) => TypeFlags::CONTAINS_DEFERRED,
            TypeData::Application(app_id) => {
                let app = self.type_application(*app_id);
                let mut flags = TypeFlags::CONTAINS_DEFERRED | self.flags_of(app.base);
                for &arg in &app.args {
                    flags |= self.flags_of(arg);
                }
                flags
            }
        }
    }

    fn param_info_flags(&self, info: &TypeParamInfo) -> TypeFlags {
        match info.constraint {
            Some(constraint) => self.flags_of(constraint),
            None => TypeFlags::empty(),
        }
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
