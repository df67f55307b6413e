//! WGSL compile and link checks.
//!
//! wgpu panics (or reports through its error sink) on invalid shaders, and it has
//! no program object with a link log. Compiling runs naga's parser and validator
//! up front so the caller gets readable diagnostics; linking matches the stage
//! interfaces against each other, against the vertex layout and against the
//! texture bind group the program is linked with.

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{Binding, Handle, Module, ShaderStage, Type, TypeInner};

use crate::gfx::ProgramLayout;

/// Entry point names resolved at link time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct LinkedEntryPoints {
    pub vertex: String,
    pub fragment: String,
}

/// Parses and validates a WGSL source; the error is the formatted diagnostic.
pub(super) fn compile(source: &str) -> Result<Module, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;
    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;
    Ok(module)
}

/// Bind group slots a textured program provides.
const TEXTURE_BINDING: u32 = 0;
const SAMPLER_BINDING: u32 = 1;

/// Checks that the two stages fit together, that every vertex input is fed by
/// the vertex layout and that resource bindings match `layout.textured`.
pub(super) fn link_interface(
    vertex: &Module,
    fragment: &Module,
    layout: &ProgramLayout,
) -> Result<LinkedEntryPoints, String> {
    let vs = entry_point(vertex, ShaderStage::Vertex)
        .ok_or_else(|| "vertex shader has no @vertex entry point".to_string())?;
    let fs = entry_point(fragment, ShaderStage::Fragment)
        .ok_or_else(|| "fragment shader has no @fragment entry point".to_string())?;

    let mut inputs = Vec::new();
    for arg in &vs.function.arguments {
        collect_locations(vertex, arg.ty, arg.binding.as_ref(), &mut inputs);
    }
    for (location, ty) in &inputs {
        let Some(attribute) = layout.vertex.attributes.iter().find(|a| a.location == *location) else {
            return Err(format!(
                "vertex input @location({location}) of `{}` has no matching vertex attribute",
                vs.name
            ));
        };
        let wanted = component_count(&vertex.types[*ty].inner).ok_or_else(|| {
            format!("vertex input @location({location}) is not a float scalar or vector")
        })?;
        if wanted > attribute.components {
            return Err(format!(
                "vertex input @location({location}) reads {wanted} components but the attribute supplies {}",
                attribute.components
            ));
        }
    }

    let mut outputs = Vec::new();
    if let Some(result) = &vs.function.result {
        collect_locations(vertex, result.ty, result.binding.as_ref(), &mut outputs);
    }
    let mut varyings = Vec::new();
    for arg in &fs.function.arguments {
        collect_locations(fragment, arg.ty, arg.binding.as_ref(), &mut varyings);
    }
    for (location, fs_ty) in &varyings {
        let Some((_, vs_ty)) = outputs.iter().find(|(l, _)| l == location) else {
            return Err(format!(
                "fragment input @location({location}) of `{}` is not written by vertex entry point `{}`",
                fs.name, vs.name
            ));
        };
        let written = &vertex.types[*vs_ty].inner;
        let read = &fragment.types[*fs_ty].inner;
        if written != read {
            return Err(format!(
                "@location({location}) is written as {} but read as {}",
                type_name(written),
                type_name(read)
            ));
        }
    }

    check_bindings(vertex, "vertex", layout.textured)?;
    check_bindings(fragment, "fragment", layout.textured)?;

    Ok(LinkedEntryPoints {
        vertex: vs.name.clone(),
        fragment: fs.name.clone(),
    })
}

fn entry_point(module: &Module, stage: ShaderStage) -> Option<&naga::EntryPoint> {
    module.entry_points.iter().find(|ep| ep.stage == stage)
}

fn collect_locations(
    module: &Module,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<(u32, Handle<Type>)>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push((*location, ty)),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

/// Every resource must live in group 0 of a textured program: a 2D texture at
/// binding 0 and a sampler at binding 1.
fn check_bindings(module: &Module, stage: &str, textured: bool) -> Result<(), String> {
    for (_, global) in module.global_variables.iter() {
        let Some(binding) = &global.binding else {
            continue;
        };
        let name = global.name.as_deref().unwrap_or("<unnamed>");
        let slot = format!("@group({}) @binding({})", binding.group, binding.binding);
        if !textured {
            return Err(format!(
                "{stage} stage binds `{name}` at {slot} but the program has no texture"
            ));
        }
        let inner = &module.types[global.ty].inner;
        let matches = binding.group == 0
            && match binding.binding {
                TEXTURE_BINDING => matches!(
                    inner,
                    TypeInner::Image {
                        dim: naga::ImageDimension::D2,
                        arrayed: false,
                        class: naga::ImageClass::Sampled {
                            kind: naga::ScalarKind::Float,
                            multi: false
                        },
                    }
                ),
                SAMPLER_BINDING => matches!(inner, TypeInner::Sampler { comparison: false }),
                _ => false,
            };
        if !matches {
            return Err(format!(
                "{stage} stage binds `{name}` at {slot}; textured programs provide only \
                 texture_2d<f32> at @group(0) @binding(0) and sampler at @group(0) @binding(1)"
            ));
        }
    }
    Ok(())
}

fn type_name(inner: &TypeInner) -> String {
    match inner {
        TypeInner::Scalar(scalar) => format!("{:?}{}", scalar.kind, scalar.width * 8),
        TypeInner::Vector { size, scalar } => {
            format!("vec{}<{:?}{}>", *size as u8, scalar.kind, scalar.width * 8)
        }
        other => format!("{other:?}"),
    }
}

fn component_count(inner: &TypeInner) -> Option<u8> {
    match inner {
        TypeInner::Scalar(scalar) if scalar.kind == naga::ScalarKind::Float => Some(1),
        TypeInner::Vector { size, scalar } if scalar.kind == naga::ScalarKind::Float => {
            Some(*size as u8)
        }
        _ => None,
    }
}
