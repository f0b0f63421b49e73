// ── Validation layer ──
//
// The one enforcement point for parameter writes. Entities stay plain data
// for the device code that owns them; anything arriving from a managing
// controller goes through `set_parameter_values`, which checks access mode,
// type, bounds and mode gates, and reports every offending parameter.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use super::{AccessMode, FieldDescriptor, ManagedEntity, ParamKind, ParamValue};
use crate::error::{FaultCode, ParameterFault, SetFault};
use crate::model::MacAddress;

/// Who is writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The managing controller (ACS): bound by access mode and mode gates.
    Controller,
    /// The device's own logic: may write read-only and gated parameters.
    Device,
}

/// Check a typed value against a descriptor's kind and bounds.
pub fn check_value(descriptor: &FieldDescriptor, value: &ParamValue) -> Result<(), ParameterFault> {
    let invalid = |message: String| {
        Err(ParameterFault::new(
            descriptor.name,
            FaultCode::InvalidParameterValue,
            message,
        ))
    };

    match (descriptor.kind, value) {
        (ParamKind::Boolean, ParamValue::Boolean(_)) | (ParamKind::DateTime, ParamValue::DateTime(_)) => {
            Ok(())
        }
        (ParamKind::Int { min, max }, ParamValue::Int(v)) => {
            if (min..=max).contains(v) {
                Ok(())
            } else {
                invalid(format!("{v} outside [{min}:{max}]"))
            }
        }
        (ParamKind::UnsignedInt { min, max }, ParamValue::UnsignedInt(v)) => {
            if (min..=max).contains(v) {
                Ok(())
            } else {
                invalid(format!("{v} outside [{min}:{max}]"))
            }
        }
        (ParamKind::String { max_len }, ParamValue::String(s)) => match max_len {
            Some(max) if s.chars().count() > max => {
                invalid(format!("longer than {max} characters"))
            }
            _ => Ok(()),
        },
        (ParamKind::Enum(allowed), ParamValue::String(s)) => {
            if allowed.contains(&s.as_str()) {
                Ok(())
            } else {
                invalid(format!("'{s}' is not one of {}", allowed.join(", ")))
            }
        }
        (ParamKind::Ipv4Address, ParamValue::String(s)) => {
            if s.is_empty() || s.parse::<Ipv4Addr>().is_ok() {
                Ok(())
            } else {
                invalid(format!("'{s}' is not an IPv4 address"))
            }
        }
        (ParamKind::MacAddress, ParamValue::String(s)) => {
            if s.is_empty() || MacAddress::parse(s).is_ok() {
                Ok(())
            } else {
                invalid(format!("'{s}' is not a MAC address"))
            }
        }
        (ParamKind::List { max_len }, ParamValue::List(items)) => {
            let len = value.to_string().chars().count();
            match max_len {
                Some(max) if len > max => {
                    invalid(format!("{} items ({len} characters) exceed {max}", items.len()))
                }
                _ => Ok(()),
            }
        }
        (kind, value) => Err(ParameterFault::new(
            descriptor.name,
            FaultCode::InvalidParameterType,
            format!("{value:?} is not a {}", kind.type_name()),
        )),
    }
}

/// Check every current parameter of `entity` against its descriptor.
pub fn validate<E: ManagedEntity>(entity: &E) -> Vec<ParameterFault> {
    E::descriptors()
        .iter()
        .filter_map(|descriptor| {
            let value = entity.get(descriptor.name)?;
            check_value(descriptor, &value).err()
        })
        .collect()
}

/// Apply a batch of `(wire name, text)` writes atomically.
///
/// On any fault nothing is applied and the returned [`SetFault`] names
/// every offending parameter.
pub fn set_parameter_values<E, N, V>(
    entity: &mut E,
    updates: &[(N, V)],
    origin: Origin,
) -> Result<(), SetFault>
where
    E: ManagedEntity,
    N: AsRef<str>,
    V: AsRef<str>,
{
    *entity = stage(entity, updates, origin)?;
    Ok(())
}

/// Validate `updates` against a copy of `entity` and return the copy.
pub(crate) fn stage<E, N, V>(entity: &E, updates: &[(N, V)], origin: Origin) -> Result<E, SetFault>
where
    E: ManagedEntity,
    N: AsRef<str>,
    V: AsRef<str>,
{
    let mut staged = entity.clone();
    let mut faults = Vec::new();
    let mut seen = HashSet::new();
    let mut gated = Vec::new();

    for (name, text) in updates {
        let name = name.as_ref();
        if !seen.insert(name) {
            faults.push(ParameterFault::new(
                name,
                FaultCode::InvalidArguments,
                "parameter appears more than once in the request",
            ));
            continue;
        }
        let Some(descriptor) = E::descriptor(name) else {
            faults.push(ParameterFault::new(
                name,
                FaultCode::InvalidParameterName,
                format!("no such parameter on {}", E::OBJECT_NAME),
            ));
            continue;
        };
        if origin == Origin::Controller && descriptor.access == AccessMode::ReadOnly {
            faults.push(ParameterFault::new(
                name,
                FaultCode::NonWritableParameter,
                "parameter is read-only",
            ));
            continue;
        }
        let value = match ParamValue::parse(descriptor.kind, text.as_ref()) {
            Ok(value) => value,
            Err(message) => {
                faults.push(ParameterFault::new(name, FaultCode::InvalidParameterType, message));
                continue;
            }
        };
        if let Err(fault) = check_value(descriptor, &value) {
            faults.push(fault);
            continue;
        }
        if let Err(message) = staged.put(name, value) {
            faults.push(ParameterFault::new(name, FaultCode::InvalidParameterValue, message));
            continue;
        }
        if origin == Origin::Controller && !descriptor.gates.is_empty() {
            gated.push(descriptor);
        }
    }

    // Gates see the staged state, so a mode switch in the same request counts.
    for descriptor in gated {
        if let Some(gate) = descriptor.gates.iter().find(|gate| !gate.is_open(&staged)) {
            faults.push(ParameterFault::new(
                descriptor.name,
                FaultCode::NonWritableParameter,
                format!("writable only when {gate}"),
            ));
        }
    }

    if faults.is_empty() {
        tracing::trace!(object = E::OBJECT_NAME, count = updates.len(), ?origin, "parameters staged");
        Ok(staged)
    } else {
        tracing::debug!(
            object = E::OBJECT_NAME,
            rejected = faults.len(),
            ?origin,
            "SetParameterValues rejected"
        );
        Err(SetFault::new(faults))
    }
}
