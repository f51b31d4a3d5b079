//! Stored-procedure parameter metadata.
//!
//! Parameters are described first with [`ParameterDescriptor`] and collected in a
//! [`ProcedureMetadataBuilder`]; [`ProcedureMetadataBuilder::build`] assigns
//! ordinals, resolves value types and validates, producing an immutable
//! [`ProcedureMetadata`] that commands share across executions.
//!
//! ```rust
//! use portable_sql::prelude::*;
//!
//! #[derive(Default)]
//! struct TotalParams {
//!     member_id: i64,
//!     total: Option<i64>,
//! }
//!
//! let metadata = ProcedureMetadataBuilder::<TotalParams>::new("SP_MEMBER_TOTAL")
//!     .parameter(
//!         ParameterDescriptor::new("member_id", DeclaredType::Integer)
//!             .mode(ParameterMode::In)
//!             .accessor(|p: &TotalParams| Some(RowValues::Int(p.member_id)), |_, _| {}),
//!     )
//!     .parameter(
//!         ParameterDescriptor::new("total", DeclaredType::Integer)
//!             .mode(ParameterMode::Return)
//!             .accessor(
//!                 |p: &TotalParams| p.total.map(RowValues::Int),
//!                 |p: &mut TotalParams, v| p.total = v.as_int().copied(),
//!             ),
//!     )
//!     .build(&ValueTypeRegistry::new())
//!     .unwrap();
//!
//! assert_eq!(metadata.build_call_sql(), "{? = call SP_MEMBER_TOTAL(?)}");
//! assert_eq!(metadata.parameters()[0].name(), "total");
//! assert_eq!(metadata.parameters()[0].ordinal(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::PortableSqlError;
use crate::types::{DeclaredType, RowValues};
use crate::value_type::{ValueType, ValueTypeRegistry};

/// Direction of a procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterMode {
    #[default]
    In,
    Out,
    InOut,
    Return,
}

impl ParameterMode {
    /// Supplies a value to the call.
    #[must_use]
    pub fn is_in_type(self) -> bool {
        matches!(self, ParameterMode::In | ParameterMode::InOut)
    }

    /// Receives a value from the call (RETURN included).
    #[must_use]
    pub fn is_out_type(self) -> bool {
        matches!(
            self,
            ParameterMode::Out | ParameterMode::InOut | ParameterMode::Return
        )
    }

    #[must_use]
    pub fn is_return_type(self) -> bool {
        self == ParameterMode::Return
    }
}

type Getter<P> = Arc<dyn Fn(&P) -> Option<RowValues> + Send + Sync>;
type Setter<P> = Arc<dyn Fn(&mut P, RowValues) + Send + Sync>;

/// Reads and writes one logical parameter on a caller-supplied container.
pub struct ParameterAccessor<P> {
    getter: Getter<P>,
    setter: Setter<P>,
}

impl<P> ParameterAccessor<P> {
    pub fn new(
        getter: impl Fn(&P) -> Option<RowValues> + Send + Sync + 'static,
        setter: impl Fn(&mut P, RowValues) + Send + Sync + 'static,
    ) -> Self {
        Self {
            getter: Arc::new(getter),
            setter: Arc::new(setter),
        }
    }
}

impl<P> Clone for ParameterAccessor<P> {
    fn clone(&self) -> Self {
        Self {
            getter: Arc::clone(&self.getter),
            setter: Arc::clone(&self.setter),
        }
    }
}

/// A parameter as registered, before ordinals exist.
pub struct ParameterDescriptor<P> {
    name: String,
    declared_type: DeclaredType,
    element_type: Option<DeclaredType>,
    mode: ParameterMode,
    accessor: Option<ParameterAccessor<P>>,
    value_type: Option<Arc<dyn ValueType>>,
}

impl<P> ParameterDescriptor<P> {
    #[must_use]
    pub fn new(name: impl Into<String>, declared_type: DeclaredType) -> Self {
        Self {
            name: name.into(),
            declared_type,
            element_type: None,
            mode: ParameterMode::default(),
            accessor: None,
            value_type: None,
        }
    }

    #[must_use]
    pub fn element_type(mut self, element_type: DeclaredType) -> Self {
        self.element_type = Some(element_type);
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: ParameterMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn accessor(
        mut self,
        getter: impl Fn(&P) -> Option<RowValues> + Send + Sync + 'static,
        setter: impl Fn(&mut P, RowValues) + Send + Sync + 'static,
    ) -> Self {
        self.accessor = Some(ParameterAccessor::new(getter, setter));
        self
    }

    #[must_use]
    pub fn with_accessor(mut self, accessor: ParameterAccessor<P>) -> Self {
        self.accessor = Some(accessor);
        self
    }

    /// Use `value_type` instead of the registry's converter for this parameter.
    #[must_use]
    pub fn value_type(mut self, value_type: Arc<dyn ValueType>) -> Self {
        self.value_type = Some(value_type);
        self
    }
}

/// A finalized parameter: ordinal, direction and converter are fixed.
pub struct ParameterMetadata<P> {
    name: String,
    declared_type: DeclaredType,
    element_type: Option<DeclaredType>,
    ordinal: usize,
    mode: ParameterMode,
    value_type: Arc<dyn ValueType>,
    accessor: ParameterAccessor<P>,
}

impl<P> ParameterMetadata<P> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn declared_type(&self) -> DeclaredType {
        self.declared_type
    }

    #[must_use]
    pub fn element_type(&self) -> Option<DeclaredType> {
        self.element_type
    }

    /// 1-based position in the call string.
    #[must_use]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    #[must_use]
    pub fn mode(&self) -> ParameterMode {
        self.mode
    }

    #[must_use]
    pub fn is_in_type(&self) -> bool {
        self.mode.is_in_type()
    }

    #[must_use]
    pub fn is_out_type(&self) -> bool {
        self.mode.is_out_type()
    }

    #[must_use]
    pub fn is_return_type(&self) -> bool {
        self.mode.is_return_type()
    }

    #[must_use]
    pub fn value_type(&self) -> &Arc<dyn ValueType> {
        &self.value_type
    }

    #[must_use]
    pub fn get_value(&self, container: &P) -> Option<RowValues> {
        (self.accessor.getter)(container)
    }

    /// Write a value returned by the database back into the container.
    ///
    /// Only OUT, INOUT and RETURN parameters may be written.
    pub fn set_value(&self, container: &mut P, value: RowValues) {
        debug_assert!(
            self.is_out_type(),
            "set_value on IN parameter {}",
            self.name
        );
        (self.accessor.setter)(container, value);
    }
}

impl<P> fmt::Debug for ParameterMetadata<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterMetadata")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("element_type", &self.element_type)
            .field("ordinal", &self.ordinal)
            .field("mode", &self.mode)
            .field("value_type", &self.value_type)
            .finish_non_exhaustive()
    }
}

/// Collects parameter descriptors for one procedure.
pub struct ProcedureMetadataBuilder<P> {
    procedure_name: String,
    descriptors: Vec<ParameterDescriptor<P>>,
}

impl<P> ProcedureMetadataBuilder<P> {
    #[must_use]
    pub fn new(procedure_name: impl Into<String>) -> Self {
        Self {
            procedure_name: procedure_name.into(),
            descriptors: Vec::new(),
        }
    }

    #[must_use]
    pub fn parameter(mut self, descriptor: ParameterDescriptor<P>) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Assign ordinals (the return parameter first, then registration order),
    /// resolve converters, and freeze.
    ///
    /// # Errors
    /// Returns `PortableSqlError::ConfigError` for an empty procedure name, more than one
    /// return parameter, a duplicate parameter name, a missing accessor, or a
    /// type the registry cannot resolve.
    pub fn build(
        self,
        registry: &ValueTypeRegistry,
    ) -> Result<ProcedureMetadata<P>, PortableSqlError> {
        if self.procedure_name.trim().is_empty() {
            return Err(PortableSqlError::ConfigError(
                "procedure name must not be empty".into(),
            ));
        }
        let return_count = self
            .descriptors
            .iter()
            .filter(|d| d.mode.is_return_type())
            .count();
        if return_count > 1 {
            return Err(PortableSqlError::ConfigError(format!(
                "procedure {} declares {return_count} return parameters",
                self.procedure_name
            )));
        }

        let mut ordered = self.descriptors;
        // stable: keeps registration order among the rest
        ordered.sort_by_key(|d| !d.mode.is_return_type());

        let mut parameters: Vec<ParameterMetadata<P>> = Vec::with_capacity(ordered.len());
        for (idx, descriptor) in ordered.into_iter().enumerate() {
            if parameters.iter().any(|p| p.name == descriptor.name) {
                return Err(PortableSqlError::ConfigError(format!(
                    "procedure {} declares parameter {} twice",
                    self.procedure_name, descriptor.name
                )));
            }
            let accessor = descriptor.accessor.ok_or_else(|| {
                PortableSqlError::ConfigError(format!(
                    "parameter {} of procedure {} has no accessor",
                    descriptor.name, self.procedure_name
                ))
            })?;
            let value_type = match descriptor.value_type {
                Some(value_type) => value_type,
                None => registry.resolve(descriptor.declared_type, descriptor.element_type)?,
            };
            parameters.push(ParameterMetadata {
                name: descriptor.name,
                declared_type: descriptor.declared_type,
                element_type: descriptor.element_type,
                ordinal: idx + 1,
                mode: descriptor.mode,
                value_type,
                accessor,
            });
        }

        Ok(ProcedureMetadata {
            procedure_name: self.procedure_name,
            parameters,
        })
    }
}

/// Immutable, ordinal-indexed description of a procedure call.
pub struct ProcedureMetadata<P> {
    procedure_name: String,
    parameters: Vec<ParameterMetadata<P>>,
}

impl<P> ProcedureMetadata<P> {
    #[must_use]
    pub fn procedure_name(&self) -> &str {
        &self.procedure_name
    }

    /// Parameters in ordinal order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterMetadata<P>] {
        &self.parameters
    }

    #[must_use]
    pub fn return_parameter(&self) -> Option<&ParameterMetadata<P>> {
        self.parameters.iter().find(|p| p.is_return_type())
    }

    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterMetadata<P>> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// `{? = call name(?, ?)}` with the return placeholder only when a return
    /// parameter exists.
    #[must_use]
    pub fn build_call_sql(&self) -> String {
        let has_return = self.return_parameter().is_some();
        let arg_count = self.parameters.len() - usize::from(has_return);
        let placeholders = vec!["?"; arg_count].join(", ");
        let prefix = if has_return { "? = " } else { "" };
        format!("{{{prefix}call {}({placeholders})}}", self.procedure_name)
    }
}

impl<P> fmt::Debug for ProcedureMetadata<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureMetadata")
            .field("procedure_name", &self.procedure_name)
            .field("parameters", &self.parameters)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Holder {
        values: std::collections::HashMap<String, RowValues>,
    }

    fn descriptor(name: &'static str, mode: ParameterMode) -> ParameterDescriptor<Holder> {
        ParameterDescriptor::new(name, DeclaredType::Integer)
            .mode(mode)
            .accessor(
                move |h: &Holder| h.values.get(name).cloned(),
                move |h: &mut Holder, v| {
                    h.values.insert(name.to_string(), v);
                },
            )
    }

    fn build(descriptors: Vec<ParameterDescriptor<Holder>>) -> ProcedureMetadata<Holder> {
        descriptors
            .into_iter()
            .fold(ProcedureMetadataBuilder::new("SP_TEST"), |b, d| b.parameter(d))
            .build(&ValueTypeRegistry::new())
            .unwrap()
    }

    #[test]
    fn call_sql_with_return_and_arguments() {
        let metadata = build(vec![
            descriptor("a", ParameterMode::In),
            descriptor("b", ParameterMode::Out),
            descriptor("r", ParameterMode::Return),
            descriptor("c", ParameterMode::InOut),
        ]);
        assert_eq!(metadata.build_call_sql(), "{? = call SP_TEST(?, ?, ?)}");
    }

    #[test]
    fn call_sql_without_return() {
        let metadata = build(vec![
            descriptor("a", ParameterMode::In),
            descriptor("b", ParameterMode::In),
        ]);
        assert_eq!(metadata.build_call_sql(), "{call SP_TEST(?, ?)}");
        assert_eq!(build(vec![]).build_call_sql(), "{call SP_TEST()}");
    }

    #[test]
    fn call_sql_with_only_return() {
        let metadata = build(vec![descriptor("r", ParameterMode::Return)]);
        assert_eq!(metadata.build_call_sql(), "{? = call SP_TEST()}");
    }

    #[test]
    fn ordinals_put_return_first_then_registration_order() {
        let metadata = build(vec![
            descriptor("a", ParameterMode::In),
            descriptor("b", ParameterMode::Out),
            descriptor("r", ParameterMode::Return),
        ]);
        let names: Vec<(&str, usize)> = metadata
            .parameters()
            .iter()
            .map(|p| (p.name(), p.ordinal()))
            .collect();
        assert_eq!(names, vec![("r", 1), ("a", 2), ("b", 3)]);
    }

    #[test]
    fn inout_sets_both_flags() {
        let mode = ParameterMode::InOut;
        assert!(mode.is_in_type() && mode.is_out_type() && !mode.is_return_type());
        assert!(ParameterMode::Return.is_out_type());
        assert!(!ParameterMode::Out.is_in_type());
    }

    #[test]
    fn two_return_parameters_are_rejected() {
        let result = ProcedureMetadataBuilder::new("SP_TEST")
            .parameter(descriptor("r1", ParameterMode::Return))
            .parameter(descriptor("r2", ParameterMode::Return))
            .build(&ValueTypeRegistry::new());
        assert!(matches!(result, Err(PortableSqlError::ConfigError(_))));
    }

    #[test]
    fn missing_accessor_is_rejected() {
        let result = ProcedureMetadataBuilder::<Holder>::new("SP_TEST")
            .parameter(ParameterDescriptor::new("a", DeclaredType::Text))
            .build(&ValueTypeRegistry::new());
        assert!(matches!(result, Err(PortableSqlError::ConfigError(_))));
    }

    #[test]
    fn array_parameter_resolves_element_converter() {
        let metadata = build(vec![
            ParameterDescriptor::new("ids", DeclaredType::Array)
                .element_type(DeclaredType::Integer)
                .accessor(|_: &Holder| None, |_: &mut Holder, _| {}),
        ]);
        let ids = metadata.parameter("ids").unwrap();
        assert_eq!(ids.element_type(), Some(DeclaredType::Integer));
        assert_eq!(ids.value_type().declared_type(), DeclaredType::Array);
    }

    #[test]
    fn accessor_round_trips_through_container() {
        let metadata = build(vec![descriptor("b", ParameterMode::Out)]);
        let mut holder = Holder::default();
        let b = metadata.parameter("b").unwrap();
        assert_eq!(b.get_value(&holder), None);
        b.set_value(&mut holder, RowValues::Int(9));
        assert_eq!(b.get_value(&holder), Some(RowValues::Int(9)));
    }
}
