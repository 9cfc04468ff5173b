use retreats_db::models::ServiceType;

#[derive(Debug, Clone)]
pub struct WishlistGroup<T> {
    pub service_type: ServiceType,
    pub data: Vec<T>,
}

/// Groups resolved entities by service type, in order of first appearance.
pub fn group_by_service_type<T>(
    entities: impl IntoIterator<Item = (ServiceType, T)>,
) -> Vec<WishlistGroup<T>> {
    let mut groups: Vec<WishlistGroup<T>> = Vec::new();
    for (service_type, entity) in entities {
        match groups.iter_mut().find(|g| g.service_type == service_type) {
            Some(group) => group.data.push(entity),
            None => groups.push(WishlistGroup {
                service_type,
                data: vec![entity],
            }),
        }
    }
    groups
}
