//! Structural type representation.
//!
//! Every type expression the engine works on is a `TypeData` value interned
//! into a [`TypeInterner`](crate::TypeInterner), which hands out lightweight
//! `TypeId` handles. Two ids are equal exactly when the underlying structures
//! are identical, so type equality is an integer comparison.
//!
//! Trees are immutable: transformations never mutate an interned structure,
//! they intern a new one and return its id.

use serde::Serialize;
use tya_common::interner::Atom;

use crate::def::DefId;

/// Interned type handle.
///
/// The first few ids are reserved for intrinsics (see the associated
/// constants); everything else is allocated by the interner in registration
/// order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const ANY: TypeId = TypeId(0);
    pub const UNKNOWN: TypeId = TypeId(1);
    pub const NEVER: TypeId = TypeId(2);
    pub const STRING: TypeId = TypeId(3);
    pub const NUMBER: TypeId = TypeId(4);
    pub const BOOLEAN: TypeId = TypeId(5);
    pub const SYMBOL: TypeId = TypeId(6);
    pub const NULL: TypeId = TypeId(7);
    pub const UNDEFINED: TypeId = TypeId(8);
    pub const VOID: TypeId = TypeId(9);
    /// The literal `true`. Pre-interned so boolean literals are as cheap as
    /// intrinsics.
    pub const BOOLEAN_TRUE: TypeId = TypeId(10);
    /// The literal `false`.
    pub const BOOLEAN_FALSE: TypeId = TypeId(11);

    /// Number of pre-registered ids.
    pub const RESERVED: u32 = 12;

    /// Check whether this id is one of the reserved intrinsics (the boolean
    /// literals included).
    #[inline]
    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::RESERVED
    }

    #[inline]
    pub const fn is_any(self) -> bool {
        self.0 == Self::ANY.0
    }

    #[inline]
    pub const fn is_unknown(self) -> bool {
        self.0 == Self::UNKNOWN.0
    }

    #[inline]
    pub const fn is_never(self) -> bool {
        self.0 == Self::NEVER.0
    }
}

/// Intrinsic (built-in, non-composite) types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IntrinsicKind {
    Any,
    Unknown,
    Never,
    String,
    Number,
    Boolean,
    Symbol,
    Null,
    Undefined,
    Void,
}

/// A literal type: one specific string, number, or boolean value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum LiteralValue {
    String(Atom),
    Number(OrderedFloat),
    Boolean(bool),
}

/// f64 wrapper with total ordering and hashing via the bit pattern, so number
/// literals can live in interner keys.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Handle into the interner's type-list table (union members, application
/// arguments).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeListId(pub u32);

/// Handle into the tuple-element table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TupleListId(pub u32);

/// Handle into the template-span table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TemplateListId(pub u32);

/// Handle into the object-shape table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectShapeId(pub u32);

/// Handle into the function-shape table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct FunctionShapeId(pub u32);

/// Handle into the conditional-type table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ConditionalTypeId(pub u32);

/// Handle into the mapped-type table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MappedTypeId(pub u32);

/// Handle into the generic-application table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeApplicationId(pub u32);

/// One element of a tuple type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleElement {
    pub type_id: TypeId,
    pub optional: bool,
}

/// One field of an object type.
///
/// Field order in [`ObjectShape::properties`] is insertion order and is
/// observable: mapped-type output preserves it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub optional: bool,
    pub readonly: bool,
}

/// Structural shape of an object type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectShape {
    pub properties: Vec<PropertyInfo>,
}

impl ObjectShape {
    /// Find a property by name.
    pub fn property(&self, name: Atom) -> Option<&PropertyInfo> {
        self.properties.iter().find(|prop| prop.name == name)
    }
}

/// One parameter of a function signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub optional: bool,
    pub rest: bool,
}

/// Structural shape of a function or constructor signature.
///
/// Constructor signatures share this shape with `is_constructor` set, the
/// instance type living in `return_type`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub this_type: Option<TypeId>,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
    pub is_constructor: bool,
}

/// A named type variable, with an optional constraint.
///
/// On an `Infer` variable the constraint filters what a match may bind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub constraint: Option<TypeId>,
}

impl TypeParamInfo {
    pub fn named(name: Atom) -> Self {
        TypeParamInfo {
            name,
            constraint: None,
        }
    }

    pub fn with_constraint(name: Atom, constraint: TypeId) -> Self {
        TypeParamInfo {
            name,
            constraint: Some(constraint),
        }
    }
}

/// A conditional type: `check extends extends_type ? true_type : false_type`.
///
/// `is_distributive` records that `check_type` was written as a bare type
/// parameter. When such a parameter is later substituted with a union, the
/// substitution distributes the whole conditional over the union members.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConditionalType {
    pub check_type: TypeId,
    pub extends_type: TypeId,
    pub true_type: TypeId,
    pub false_type: TypeId,
    pub is_distributive: bool,
}

/// Modifier delta on a mapped type: `+` adds the modifier, `-` strips it.
/// Absence (`None` on the mapped type) preserves the source field's flag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MappedModifier {
    Add,
    Remove,
}

/// A mapped type: `{ [K in constraint as name_type]: template }` plus
/// optional/readonly modifier deltas.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MappedType {
    /// The iteration variable (`K`).
    pub type_param: TypeParamInfo,
    /// The key source: a `KeyOf` type or a literal-string union.
    pub constraint: TypeId,
    /// Optional key remap (`as` clause), instantiated per key. Remapping a
    /// key to `never` filters it out of the result.
    pub name_type: Option<TypeId>,
    /// The per-key value type, typically `IndexAccess(source, K)` or a
    /// constant.
    pub template: TypeId,
    pub optional_modifier: Option<MappedModifier>,
    pub readonly_modifier: Option<MappedModifier>,
}

/// One segment of a template-literal type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TemplateSpan {
    /// A fixed text fragment.
    Text(Atom),
    /// An interpolated type; must expand to string literals for the template
    /// to resolve.
    Type(TypeId),
}

/// Case-transform intrinsics applicable to string literal types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum StringIntrinsicKind {
    Uppercase,
    Lowercase,
    Capitalize,
    Uncapitalize,
}

/// A generic alias reference with arguments: `Alias<Args...>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeApplication {
    pub base: TypeId,
    pub args: Vec<TypeId>,
}

/// The universal type representation. One variant per kind of type
/// expression; composite variants hold handles into the interner's side
/// tables.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    Literal(LiteralValue),
    /// Flattened, deduplicated member list. Never directly contains another
    /// union.
    Union(TypeListId),
    Tuple(TupleListId),
    Object(ObjectShapeId),
    Function(FunctionShapeId),
    /// A named type variable; meaningful only under a substitution that
    /// binds it.
    TypeParameter(TypeParamInfo),
    /// A pattern variable declared inside a conditional's extends clause.
    Infer(TypeParamInfo),
    Conditional(ConditionalTypeId),
    Mapped(MappedTypeId),
    TemplateLiteral(TemplateListId),
    /// Key-set query: the union of an object's key literals.
    KeyOf(TypeId),
    /// Field lookup: `object[index]`.
    IndexAccess(TypeId, TypeId),
    StringIntrinsic {
        kind: StringIntrinsicKind,
        type_arg: TypeId,
    },
    /// Reference to a registered alias.
    Lazy(DefId),
    Application(TypeApplicationId),
}

bitflags::bitflags! {
    /// Per-type classification, computed once at intern time.
    ///
    /// Lets the evaluator decide in O(1) whether a tree is fully concrete or
    /// still contains variables / deferred computations.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct TypeFlags: u8 {
        /// Contains a `TypeParameter` anywhere.
        const CONTAINS_TYPE_PARAMETER = 1 << 0;
        /// Contains an `Infer` variable anywhere.
        const CONTAINS_INFER = 1 << 1;
        /// Contains a computation that evaluation may rewrite (conditional,
        /// mapped, keyof, index access, template literal, string intrinsic,
        /// alias reference, application).
        const CONTAINS_DEFERRED = 1 << 2;
    }
}
