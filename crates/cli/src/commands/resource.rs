//! Generic resource commands

use anyhow::Result;

use super::BundleContext;
use crate::output::{print_describe, print_get_table, print_info, print_names, print_warning, OutputFormat};
use bundle_lib::resolver::{available_resource_types, TypeMatch};
use bundle_lib::resources::namespace_scope;
use bundle_lib::{ArchivedResource, GenericResource, Scope};

fn resolve(ctx: &BundleContext, token: &str, clusterwide: bool) -> Result<GenericResource> {
    let resource = if clusterwide {
        GenericResource::clusterwide(ctx.source.clone(), token)?
    } else {
        GenericResource::namespaced(ctx.source.clone(), token)?
    };

    let resolved = resource.resolved();
    if let TypeMatch::Fuzzy { score } = resolved.matched_by {
        if ctx.format == OutputFormat::Table {
            print_warning(&format!(
                "'{}' not found, showing '{}' (similarity {:.2})",
                token, resolved.resource_type, score
            ));
        }
    }
    Ok(resource)
}

/// Show the `kubectl get` table of a resource type
pub fn show_status(ctx: &BundleContext, token: &str, clusterwide: bool) -> Result<()> {
    print_get_table(&resolve(ctx, token, clusterwide)?.resource_status()?, ctx.format)
}

/// List resource names of a resource type
pub fn list_names(ctx: &BundleContext, token: &str, clusterwide: bool) -> Result<()> {
    print_names(&resolve(ctx, token, clusterwide)?.resource_names()?, ctx.format)
}

/// Show describe output of a resource type
pub fn describe(ctx: &BundleContext, token: &str, clusterwide: bool) -> Result<()> {
    print_describe(&resolve(ctx, token, clusterwide)?.resource_describe()?, ctx.format)
}

/// List resource types present in the bundle
pub fn list_types(ctx: &BundleContext, clusterwide: bool) -> Result<()> {
    let scope = if clusterwide {
        Scope::Clusterwide
    } else {
        namespace_scope(ctx.source.as_ref())?
    };

    let types = available_resource_types(ctx.source.as_ref(), &scope);
    if ctx.format == OutputFormat::Table {
        print_info(&format!("{} resource types in {}", types.len(), scope.dir_name()));
    }
    print_names(&types, ctx.format)
}
