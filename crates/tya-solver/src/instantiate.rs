//! Type-variable substitution.
//!
//! `instantiate_type` replaces bound `TypeParameter` and `Infer` variables in
//! a tree and interns the rebuilt structure, leaving unchanged subtrees
//! shared. Both generic alias instantiation and infer-binding substitution go
//! through the same machinery.
//!
//! Distribution lives here, as it does in the host language: substituting a
//! union into the bare-parameter check of a distributive conditional rewrites
//! the conditional into a union of per-member conditionals. The evaluator
//! then resolves each member conditional against a concrete check type.
//! Substituting into a wrapped check (say a tuple `[T]`) takes the ordinary
//! rebuild path and does not distribute.

use rustc_hash::FxHashMap;
use tya_common::interner::Atom;

use crate::intern::TypeInterner;
use crate::types::*;

/// A scoped mapping from type-variable names to bound types.
///
/// Created per instantiation/resolution call and discarded when the call
/// returns; the engine keeps no cross-call binding state.
#[derive(Clone, Debug, Default)]
pub struct TypeSubstitution {
    map: FxHashMap<Atom, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        TypeSubstitution {
            map: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, name: Atom, type_id: TypeId) {
        self.map.insert(name, type_id);
    }

    pub fn get(&self, name: Atom) -> Option<TypeId> {
        self.map.get(&name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Merge `other` over `self`: bindings in `other` shadow same-named
    /// bindings already present.
    pub fn extended_with(&self, other: &TypeSubstitution) -> TypeSubstitution {
        let mut merged = self.clone();
        for (&name, &type_id) in &other.map {
            merged.map.insert(name, type_id);
        }
        merged
    }
}

impl FromIterator<(Atom, TypeId)> for TypeSubstitution {
    fn from_iter<I: IntoIterator<Item = (Atom, TypeId)>>(iter: I) -> Self {
        TypeSubstitution {
            map: iter.into_iter().collect(),
        }
    }
}

/// Substitute bound variables in `type_id`, returning the rebuilt type.
pub fn instantiate_type(
    interner: &TypeInterner,
    type_id: TypeId,
    subst: &TypeSubstitution,
) -> TypeId {
    if subst.is_empty() {
        return type_id;
    }
    let mut substituter = Substituter::new(interner, subst);
    substituter.substitute(type_id)
}

/// Bind `params` to `args` positionally and substitute into `body`.
/// The caller is responsible for arity checking.
pub fn instantiate_generic(
    interner: &TypeInterner,
    body: TypeId,
    params: &[TypeParamInfo],
    args: &[TypeId],
) -> TypeId {
    let subst: TypeSubstitution = params
        .iter()
        .zip(args.iter())
        .map(|(param, &arg)| (param.name, arg))
        .collect();
    instantiate_type(interner, body, &subst)
}

/// Collect the infer-variable names a conditional's extends clause declares.
///
/// Does not descend into nested conditionals: their infer variables belong
/// to them.
pub fn collect_infer_names(interner: &TypeInterner, type_id: TypeId, out: &mut Vec<Atom>) {
    if !interner
        .flags_of(type_id)
        .intersects(TypeFlags::CONTAINS_INFER)
    {
        return;
    }
    let Some(key) = interner.lookup(type_id) else {
        return;
    };
    match key {
        TypeData::Infer(info) => {
            if !out.contains(&info.name) {
                out.push(info.name);
            }
        }
        TypeData::Union(list_id) => {
            for &member in interner.type_list(list_id).iter() {
                collect_infer_names(interner, member, out);
            }
        }
        TypeData::Tuple(list_id) => {
            for elem in interner.tuple_list(list_id).iter() {
                collect_infer_names(interner, elem.type_id, out);
            }
        }
        TypeData::Object(shape_id) => {
            for prop in &interner.object_shape(shape_id).properties {
                collect_infer_names(interner, prop.type_id, out);
            }
        }
        TypeData::Function(shape_id) => {
            let shape = interner.function_shape(shape_id);
            if let Some(this_type) = shape.this_type {
                collect_infer_names(interner, this_type, out);
            }
            for param in &shape.params {
                collect_infer_names(interner, param.type_id, out);
            }
            collect_infer_names(interner, shape.return_type, out);
        }
        TypeData::TemplateLiteral(list_id) => {
            for span in interner.template_list(list_id).iter() {
                if let TemplateSpan::Type(inner) = span {
                    collect_infer_names(interner, *inner, out);
                }
            }
        }
        TypeData::KeyOf(operand) => collect_infer_names(interner, operand, out),
        TypeData::IndexAccess(object, index) => {
            collect_infer_names(interner, object, out);
            collect_infer_names(interner, index, out);
        }
        TypeData::StringIntrinsic { type_arg, .. } => {
            collect_infer_names(interner, type_arg, out);
        }
        TypeData::Mapped(mapped_id) => {
            let mapped = interner.mapped_type(mapped_id);
            collect_infer_names(interner, mapped.constraint, out);
            if let Some(name_type) = mapped.name_type {
                collect_infer_names(interner, name_type, out);
            }
            collect_infer_names(interner, mapped.template, out);
        }
        TypeData::Application(app_id) => {
            let app = interner.type_application(app_id);
            collect_infer_names(interner, app.base, out);
            for &arg in &app.args {
                collect_infer_names(interner, arg, out);
            }
        }
        // Nested conditionals own their infer declarations.
        TypeData::Conditional(_) => {}
        TypeData::Intrinsic(_)
        | TypeData::Literal(_)
        | TypeData::TypeParameter(_)
        | TypeData::Lazy(_) => {}
    }
}

/// Collect free `TypeParameter` names in a tree, respecting the binders that
/// scope them (a mapped type binds its iteration variable for its name type
/// and template).
pub fn collect_free_type_params(interner: &TypeInterner, type_id: TypeId, out: &mut Vec<Atom>) {
    let mut bound = Vec::new();
    collect_free_inner(interner, type_id, &mut bound, out);
}

fn collect_free_inner(
    interner: &TypeInterner,
    type_id: TypeId,
    bound: &mut Vec<Atom>,
    out: &mut Vec<Atom>,
) {
    if !interner
        .flags_of(type_id)
        .intersects(TypeFlags::CONTAINS_TYPE_PARAMETER)
    {
        return;
    }
    let Some(key) = interner.lookup(type_id) else {
        return;
    };
    match key {
        TypeData::TypeParameter(info) => {
            if !bound.contains(&info.name) && !out.contains(&info.name) {
                out.push(info.name);
            }
        }
        TypeData::Union(list_id) => {
            for &member in interner.type_list(list_id).iter() {
                collect_free_inner(interner, member, bound, out);
            }
        }
        TypeData::Tuple(list_id) => {
            for elem in interner.tuple_list(list_id).iter() {
                collect_free_inner(interner, elem.type_id, bound, out);
            }
        }
        TypeData::Object(shape_id) => {
            for prop in &interner.object_shape(shape_id).properties {
                collect_free_inner(interner, prop.type_id, bound, out);
            }
        }
        TypeData::Function(shape_id) => {
            let shape = interner.function_shape(shape_id);
            if let Some(this_type) = shape.this_type {
                collect_free_inner(interner, this_type, bound, out);
            }
            for param in &shape.params {
                collect_free_inner(interner, param.type_id, bound, out);
            }
            collect_free_inner(interner, shape.return_type, bound, out);
        }
        TypeData::Conditional(cond_id) => {
            let cond = interner.conditional_type(cond_id);
            collect_free_inner(interner, cond.check_type, bound, out);
            collect_free_inner(interner, cond.extends_type, bound, out);
            collect_free_inner(interner, cond.true_type, bound, out);
            collect_free_inner(interner, cond.false_type, bound, out);
        }
        TypeData::Mapped(mapped_id) => {
            let mapped = interner.mapped_type(mapped_id);
            collect_free_inner(interner, mapped.constraint, bound, out);
            bound.push(mapped.type_param.name);
            if let Some(name_type) = mapped.name_type {
                collect_free_inner(interner, name_type, bound, out);
            }
            collect_free_inner(interner, mapped.template, bound, out);
            bound.pop();
        }
        TypeData::TemplateLiteral(list_id) => {
            for span in interner.template_list(list_id).iter() {
                if let TemplateSpan::Type(inner) = span {
                    collect_free_inner(interner, *inner, bound, out);
                }
            }
        }
        TypeData::KeyOf(operand) => collect_free_inner(interner, operand, bound, out),
        TypeData::IndexAccess(object, index) => {
            collect_free_inner(interner, object, bound, out);
            collect_free_inner(interner, index, bound, out);
        }
        TypeData::StringIntrinsic { type_arg, .. } => {
            collect_free_inner(interner, type_arg, bound, out);
        }
        TypeData::Application(app_id) => {
            let app = interner.type_application(app_id);
            collect_free_inner(interner, app.base, bound, out);
            for &arg in &app.args {
                collect_free_inner(interner, arg, bound, out);
            }
        }
        TypeData::Infer(_) | TypeData::Intrinsic(_) | TypeData::Literal(_) | TypeData::Lazy(_) => {}
    }
}

/// Deep substitution walker. Rebuilds only subtrees that actually change.
struct Substituter<'a> {
    interner: &'a TypeInterner,
    subst: &'a TypeSubstitution,
    /// Names hidden from the substitution by an enclosing binder (a mapped
    /// type's iteration variable, a conditional's infer declarations).
    shadowed: Vec<Atom>,
}

impl<'a> Substituter<'a> {
    fn new(interner: &'a TypeInterner, subst: &'a TypeSubstitution) -> Self {
        Substituter {
            interner,
            subst,
            shadowed: Vec::new(),
        }
    }

    fn binding_for(&self, name: Atom) -> Option<TypeId> {
        if self.shadowed.contains(&name) {
            return None;
        }
        self.subst.get(name)
    }

    fn substitute(&mut self, type_id: TypeId) -> TypeId {
        if !self
            .interner
            .flags_of(type_id)
            .intersects(TypeFlags::CONTAINS_TYPE_PARAMETER | TypeFlags::CONTAINS_INFER)
        {
            return type_id;
        }

        let Some(key) = self.interner.lookup(type_id) else {
            return type_id;
        };

        match key {
            TypeData::TypeParameter(info) | TypeData::Infer(info) => {
                self.binding_for(info.name).unwrap_or(type_id)
            }
            TypeData::Union(members) => {
                let members = self.interner.type_list(members);
                let mut changed = false;
                let mut new_members = Vec::with_capacity(members.len());
                for &member in members.iter() {
                    let substituted = self.substitute(member);
                    if substituted != member {
                        changed = true;
                    }
                    new_members.push(substituted);
                }
                if changed {
                    self.interner.union(new_members)
                } else {
                    type_id
                }
            }
            TypeData::Tuple(elements) => {
                let elements = self.interner.tuple_list(elements);
                let mut changed = false;
                let mut new_elements = Vec::with_capacity(elements.len());
                for element in elements.iter() {
                    let substituted = self.substitute(element.type_id);
                    if substituted != element.type_id {
                        changed = true;
                    }
                    new_elements.push(TupleElement {
                        type_id: substituted,
                        optional: element.optional,
                    });
                }
                if changed {
                    self.interner.tuple(new_elements)
                } else {
                    type_id
                }
            }
            TypeData::Object(shape_id) => {
                let shape = self.interner.object_shape(shape_id);
                let mut changed = false;
                let mut properties = Vec::with_capacity(shape.properties.len());
                for prop in shape.properties.iter() {
                    let substituted = self.substitute(prop.type_id);
                    if substituted != prop.type_id {
                        changed = true;
                    }
                    properties.push(PropertyInfo {
                        name: prop.name,
                        type_id: substituted,
                        optional: prop.optional,
                        readonly: prop.readonly,
                    });
                }
                if changed {
                    self.interner.object(properties)
                } else {
                    type_id
                }
            }
            TypeData::Function(shape_id) => {
                let shape = self.interner.function_shape(shape_id);
                let mut changed = false;
                let mut new_params = Vec::with_capacity(shape.params.len());
                for param in shape.params.iter() {
                    let substituted = self.substitute(param.type_id);
                    if substituted != param.type_id {
                        changed = true;
                    }
                    new_params.push(ParamInfo {
                        name: param.name,
                        type_id: substituted,
                        optional: param.optional,
                        rest: param.rest,
                    });
                }
                let return_type = self.substitute(shape.return_type);
                if return_type != shape.return_type {
                    changed = true;
                }
                let this_type = shape.this_type.map(|t| {
                    let substituted = self.substitute(t);
                    if substituted != t {
                        changed = true;
                    }
                    substituted
                });
                if changed {
                    self.interner.function(FunctionShape {
                        this_type,
                        params: new_params,
                        return_type,
                        is_constructor: shape.is_constructor,
                    })
                } else {
                    type_id
                }
            }
            TypeData::Conditional(cond_id) => {
                let cond = self.interner.conditional_type(cond_id);

                // Distribution: a distributive conditional whose bare-parameter
                // check is being replaced by a union becomes the union of the
                // per-member instantiations.
                if cond.is_distributive
                    && let Some(TypeData::TypeParameter(info)) =
                        self.interner.lookup(cond.check_type)
                    && let Some(bound) = self.binding_for(info.name)
                    && let Some(TypeData::Union(member_list)) = self.interner.lookup(bound)
                {
                    let members = self.interner.type_list(member_list);
                    let mut distributed = Vec::with_capacity(members.len());
                    for &member in members.iter() {
                        let mut per_member = self.subst.clone();
                        per_member.insert(info.name, member);
                        let mut inner = Substituter {
                            interner: self.interner,
                            subst: &per_member,
                            shadowed: self.shadowed.clone(),
                        };
                        distributed.push(inner.substitute(type_id));
                    }
                    return self.interner.union(distributed);
                }

                let check_type = self.substitute(cond.check_type);

                // The extends clause and true branch see this conditional's
                // infer declarations, which shadow outer bindings.
                let mut declared = Vec::new();
                collect_infer_names(self.interner, cond.extends_type, &mut declared);
                let shadow_base = self.shadowed.len();
                self.shadowed.extend(declared);

                let extends_type = self.substitute(cond.extends_type);
                let true_type = self.substitute(cond.true_type);

                self.shadowed.truncate(shadow_base);
                let false_type = self.substitute(cond.false_type);

                if check_type == cond.check_type
                    && extends_type == cond.extends_type
                    && true_type == cond.true_type
                    && false_type == cond.false_type
                {
                    type_id
                } else {
                    self.interner.conditional(ConditionalType {
                        check_type,
                        extends_type,
                        true_type,
                        false_type,
                        is_distributive: cond.is_distributive,
                    })
                }
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = self.interner.mapped_type(mapped_id);
                let constraint = self.substitute(mapped.constraint);

                // The iteration variable is bound by the mapped type for its
                // name type and template.
                self.shadowed.push(mapped.type_param.name);
                let name_type = mapped.name_type.map(|t| self.substitute(t));
                let template = self.substitute(mapped.template);
                self.shadowed.pop();

                if constraint == mapped.constraint
                    && name_type == mapped.name_type
                    && template == mapped.template
                {
                    type_id
                } else {
                    self.interner.mapped(MappedType {
                        type_param: mapped.type_param.clone(),
                        constraint,
                        name_type,
                        template,
                        optional_modifier: mapped.optional_modifier,
                        readonly_modifier: mapped.readonly_modifier,
                    })
                }
            }
            TypeData::TemplateLiteral(spans) => {
                let spans = self.interner.template_list(spans);
                let mut changed = false;
                let mut new_spans = Vec::with_capacity(spans.len());
                for span in spans.iter() {
                    let new_span = match span {
                        TemplateSpan::Text(text) => TemplateSpan::Text(*text),
                        TemplateSpan::Type(inner) => {
                            let substituted = self.substitute(*inner);
                            if substituted != *inner {
                                changed = true;
                            }
                            TemplateSpan::Type(substituted)
                        }
                    };
                    new_spans.push(new_span);
                }
                if changed {
                    self.interner.template_literal(new_spans)
                } else {
                    type_id
                }
            }
            TypeData::KeyOf(inner) => {
                let new_inner = self.substitute(inner);
                if new_inner == inner {
                    type_id
                } else {
                    self.interner.keyof(new_inner)
                }
            }
            TypeData::IndexAccess(object, index) => {
                let new_object = self.substitute(object);
                let new_index = self.substitute(index);
                if new_object == object && new_index == index {
                    type_id
                } else {
                    self.interner.index_access(new_object, new_index)
                }
            }
            TypeData::StringIntrinsic { kind, type_arg } => {
                let new_arg = self.substitute(type_arg);
                if new_arg == type_arg {
                    type_id
                } else {
                    self.interner.string_intrinsic(kind, new_arg)
                }
            }
            TypeData::Application(app_id) => {
                let app = self.interner.type_application(app_id);
                let base = self.substitute(app.base);
                let mut changed = base != app.base;
                let mut new_args = Vec::with_capacity(app.args.len());
                for &arg in &app.args {
                    let substituted = self.substitute(arg);
                    if substituted != arg {
                        changed = true;
                    }
                    new_args.push(substituted);
                }
                if changed {
                    self.interner.application(base, new_args)
                } else {
                    type_id
                }
            }
            TypeData::Intrinsic(_) | TypeData::Literal(_) | TypeData::Lazy(_) => type_id,
        }
    }
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
