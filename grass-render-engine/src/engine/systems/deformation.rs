use bevy::prelude::*;

use crate::engine::grass::deformation::{FlattenRequest, GrassDeformationSink, Trampler};
use crate::engine::grass::field::GrassField;

/// Stamps each trampler at its override entity's position, falling back to
/// its own when there is no override or the override has no transform.
pub fn emit_trample_requests(
    tramplers: Query<(&Trampler, &GlobalTransform)>,
    transforms: Query<&GlobalTransform>,
    mut requests: EventWriter<FlattenRequest>,
) {
    for (trampler, transform) in &tramplers {
        let position = trampler
            .position_override
            .and_then(|entity| transforms.get(entity).ok())
            .unwrap_or(transform)
            .translation();
        requests.write(trampler.request_at(position));
    }
}

/// Delivers flatten requests to their target field, or to the active sink.
/// Requests nobody can take are dropped.
pub fn route_flatten_requests(
    mut requests: EventReader<FlattenRequest>,
    sink: Res<GrassDeformationSink>,
    mut fields: Query<&mut GrassField>,
) {
    for request in requests.read() {
        let Some(target) = sink.resolve(request) else {
            continue;
        };
        let Ok(mut field) = fields.get_mut(target) else {
            continue;
        };
        field.register_flatten(
            request.position,
            request.radius,
            request.weight,
            request.lifetime,
        );
    }
}
