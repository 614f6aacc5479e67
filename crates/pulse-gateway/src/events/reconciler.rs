//! Event reconciler
//!
//! Consumes decoded dispatch envelopes, mutates the entity cache, computes
//! before/after snapshots, and emits normalized events to the dispatcher.
//! A malformed frame is logged and dropped; it never takes down the session.

use super::entity::Entity;
use super::registry::{Action, EntityKind, EventRegistry, EventRoute, GuildList, IdStrategy};
use crate::dispatch::{Dispatcher, EventPayload};
use crate::interactions::{InteractionContext, InteractionKind};
use pulse_cache::{CacheError, CacheKey, EntityCache};
use pulse_core::Snowflake;
use serde_json::Value;
use std::sync::Arc;

/// Reconciles dispatch events into the entity cache
///
/// The reconciler is the cache's single writer.
pub struct EventReconciler {
    cache: Arc<EntityCache>,
    dispatcher: Arc<Dispatcher>,
    registry: EventRegistry,
}

impl EventReconciler {
    /// Create a reconciler over the given cache and dispatcher
    #[must_use]
    pub fn new(cache: Arc<EntityCache>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            cache,
            dispatcher,
            registry: EventRegistry::new(),
        }
    }

    /// The cache this reconciler writes to
    pub fn cache(&self) -> &Arc<EntityCache> {
        &self.cache
    }

    /// Process one dispatch event
    pub fn process(&self, name: &str, data: &Value) {
        self.dispatcher
            .dispatch("raw_socket_receive", &EventPayload::Raw(data.clone()));

        if name == "INTERACTION_CREATE" {
            self.process_interaction(data);
            return;
        }

        let Some(route) = self.registry.route(name) else {
            tracing::debug!(event = %name, "Unrouted event, forwarded raw only");
            return;
        };

        let event = name.to_ascii_lowercase();
        let result = match route.action {
            Action::Create => self.apply_create(route, &event, data),
            Action::Update => self.apply_update(route, &event, data),
            Action::Delete => self.apply_delete(route, &event, data),
            Action::Forward => {
                self.dispatcher
                    .dispatch(&format!("on_{event}"), &EventPayload::Raw(data.clone()));
                Ok(())
            }
        };

        if let Err(error) = result {
            tracing::warn!(event = %name, error = %error, "Dropped undecodable event");
        }
    }

    fn apply_create(
        &self,
        route: &EventRoute,
        event: &str,
        data: &Value,
    ) -> Result<(), CacheError> {
        let entity = decode_entity(route.kind, data)?;
        let key = derive_key(route, data);

        if let Some(key) = key {
            self.cache_add(route.kind, key, &entity);
        }

        self.dispatcher
            .dispatch(&format!("on_{event}"), &EventPayload::Entity(entity.clone()));

        self.sync_guild_list(route, Action::Create, data, Some(&entity), key);
        Ok(())
    }

    fn apply_update(
        &self,
        route: &EventRoute,
        event: &str,
        data: &Value,
    ) -> Result<(), CacheError> {
        let decoded = decode_entity(route.kind, data)?;

        self.dispatcher.dispatch(
            &format!("on_raw_{event}"),
            &EventPayload::Entity(decoded.clone()),
        );

        let Some(key) = derive_key(route, data) else {
            return Ok(());
        };

        let (before, after) = self.cache_merge(route.kind, key, data)?;
        // An update observed before any create: the new value stands in for
        // the missing prior snapshot.
        let before = before.unwrap_or_else(|| after.clone());

        self.sync_guild_list(route, Action::Update, data, Some(&after), Some(key));

        self.dispatcher.dispatch(
            &format!("on_{event}"),
            &EventPayload::Pair {
                before: Box::new(before),
                after: Box::new(after),
            },
        );
        Ok(())
    }

    fn apply_delete(
        &self,
        route: &EventRoute,
        event: &str,
        data: &Value,
    ) -> Result<(), CacheError> {
        self.dispatcher
            .dispatch(&format!("on_raw_{event}"), &EventPayload::Raw(data.clone()));

        let key = derive_key(route, data);
        self.sync_guild_list(route, Action::Delete, data, None, key);

        let evicted = key.and_then(|key| self.cache_pop(route.kind, key));
        let payload = match evicted {
            Some(entity) => EventPayload::Entity(entity),
            None => EventPayload::Raw(data.clone()),
        };
        self.dispatcher.dispatch(&format!("on_{event}"), &payload);
        Ok(())
    }

    fn process_interaction(&self, data: &Value) {
        let ctx: InteractionContext = match serde_json::from_value(data.clone()) {
            Ok(ctx) => ctx,
            Err(error) => {
                tracing::warn!(error = %error, "Dropped undecodable interaction");
                return;
            }
        };

        let generic = match ctx.kind {
            InteractionKind::Ping => {
                tracing::trace!("Ignoring interaction ping");
                return;
            }
            InteractionKind::ApplicationCommand => "on_command",
            InteractionKind::MessageComponent => "on_component",
            InteractionKind::Autocomplete => "on_autocomplete",
            InteractionKind::ModalSubmit => "on_modal",
        };

        let name = ctx.dispatch_name();
        let payload = EventPayload::Interaction(Box::new(ctx));

        self.dispatcher.dispatch(generic, &payload);
        if let Some(name) = name {
            self.dispatcher.dispatch(&name, &payload);
        }
        self.dispatcher.dispatch("on_interaction", &payload);
    }

    fn cache_add(&self, kind: EntityKind, key: CacheKey, entity: &Entity) {
        match (kind, entity) {
            (EntityKind::Guild, Entity::Guild(g)) => self.cache.guilds.add(key, (**g).clone()),
            (EntityKind::Channel | EntityKind::Thread, Entity::Channel(c)) => {
                self.cache.channels.add(key, (**c).clone());
            }
            (EntityKind::Message, Entity::Message(m)) => self.cache.messages.add(key, (**m).clone()),
            (EntityKind::User, Entity::User(u)) => self.cache.users.add(key, (**u).clone()),
            (EntityKind::Member, Entity::Member(m)) => self.cache.members.add(key, (**m).clone()),
            (EntityKind::Role, Entity::Role(r)) => self.cache.roles.add(key, (**r).clone()),
            (EntityKind::Presence, Entity::Presence(p)) => {
                self.cache.presences.add(key, (**p).clone());
            }
            _ => {}
        }
    }

    fn cache_merge(
        &self,
        kind: EntityKind,
        key: CacheKey,
        data: &Value,
    ) -> Result<(Option<Entity>, Entity), CacheError> {
        let patch = decode_source(kind, data);
        match kind {
            EntityKind::Guild => {
                let outcome = self.cache.guilds.merge(key, patch)?;
                Ok((
                    outcome.before.map(|g| Entity::Guild(Box::new(g))),
                    Entity::Guild(Box::new(outcome.after)),
                ))
            }
            EntityKind::Channel | EntityKind::Thread => {
                let outcome = self.cache.channels.merge(key, patch)?;
                Ok((
                    outcome.before.map(|c| Entity::Channel(Box::new(c))),
                    Entity::Channel(Box::new(outcome.after)),
                ))
            }
            EntityKind::Message => {
                let outcome = self.cache.messages.merge(key, patch)?;
                Ok((
                    outcome.before.map(|m| Entity::Message(Box::new(m))),
                    Entity::Message(Box::new(outcome.after)),
                ))
            }
            EntityKind::User => {
                let outcome = self.cache.users.merge(key, patch)?;
                Ok((
                    outcome.before.map(|u| Entity::User(Box::new(u))),
                    Entity::User(Box::new(outcome.after)),
                ))
            }
            EntityKind::Member => {
                let outcome = self.cache.members.merge(key, patch)?;
                Ok((
                    outcome.before.map(|m| Entity::Member(Box::new(m))),
                    Entity::Member(Box::new(outcome.after)),
                ))
            }
            EntityKind::Role => {
                let outcome = self.cache.roles.merge(key, patch)?;
                Ok((
                    outcome.before.map(|r| Entity::Role(Box::new(r))),
                    Entity::Role(Box::new(outcome.after)),
                ))
            }
            EntityKind::Presence => {
                let outcome = self.cache.presences.merge(key, patch)?;
                Ok((
                    outcome.before.map(|p| Entity::Presence(Box::new(p))),
                    Entity::Presence(Box::new(outcome.after)),
                ))
            }
        }
    }

    fn cache_pop(&self, kind: EntityKind, key: CacheKey) -> Option<Entity> {
        match kind {
            EntityKind::Guild => self.cache.guilds.pop(key).map(|g| Entity::Guild(Box::new(g))),
            EntityKind::Channel | EntityKind::Thread => {
                self.cache.channels.pop(key).map(|c| Entity::Channel(Box::new(c)))
            }
            EntityKind::Message => self.cache.messages.pop(key).map(|m| Entity::Message(Box::new(m))),
            EntityKind::User => self.cache.users.pop(key).map(|u| Entity::User(Box::new(u))),
            EntityKind::Member => self.cache.members.pop(key).map(|m| Entity::Member(Box::new(m))),
            EntityKind::Role => self.cache.roles.pop(key).map(|r| Entity::Role(Box::new(r))),
            EntityKind::Presence => {
                self.cache.presences.pop(key).map(|p| Entity::Presence(Box::new(p)))
            }
        }
    }

    /// Mirror the child operation into the owning guild's sub-collection,
    /// exactly once, keyed by the child's id.
    fn sync_guild_list(
        &self,
        route: &EventRoute,
        action: Action,
        data: &Value,
        entity: Option<&Entity>,
        key: Option<CacheKey>,
    ) {
        if route.guild_list == GuildList::Skip {
            return;
        }
        let Some(guild_id) = guild_id_of(data) else {
            return;
        };
        let Some(child_id) = child_id_of(key) else {
            return;
        };

        let guild_key = CacheKey::Id(guild_id);
        let Some(mut guild) = self.cache.guilds.get(guild_key) else {
            return;
        };

        match (route.guild_list, action) {
            (GuildList::Channels, Action::Delete) => guild.remove_channel(child_id),
            (GuildList::Channels, _) => {
                if let Some(Entity::Channel(channel)) = entity {
                    guild.upsert_channel((**channel).clone());
                }
            }
            (GuildList::Threads, Action::Delete) => guild.remove_thread(child_id),
            (GuildList::Threads, _) => {
                if let Some(Entity::Channel(thread)) = entity {
                    guild.upsert_thread((**thread).clone());
                }
            }
            (GuildList::Roles, Action::Delete) => guild.remove_role(child_id),
            (GuildList::Roles, _) => {
                if let Some(Entity::Role(role)) = entity {
                    guild.upsert_role((**role).clone());
                }
            }
            (GuildList::Members, Action::Delete) => guild.remove_member(child_id),
            (GuildList::Members, _) => {
                if let Some(Entity::Member(member)) = entity {
                    guild.upsert_member((**member).clone());
                }
            }
            (GuildList::Skip, _) => return,
        }

        self.cache.guilds.add(guild_key, guild);
    }
}

impl std::fmt::Debug for EventReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventReconciler")
            .field("routes", &self.registry.len())
            .finish()
    }
}

/// The payload subtree an entity decodes from
fn decode_source(kind: EntityKind, data: &Value) -> &Value {
    match kind {
        // Role events nest the role under a `role` field
        EntityKind::Role => data.get("role").unwrap_or(data),
        _ => data,
    }
}

fn decode_entity(kind: EntityKind, data: &Value) -> Result<Entity, CacheError> {
    let source = decode_source(kind, data).clone();
    let entity = match kind {
        EntityKind::Guild => Entity::Guild(Box::new(serde_json::from_value(source)?)),
        EntityKind::Channel | EntityKind::Thread => {
            Entity::Channel(Box::new(serde_json::from_value(source)?))
        }
        EntityKind::Message => Entity::Message(Box::new(serde_json::from_value(source)?)),
        EntityKind::User => Entity::User(Box::new(serde_json::from_value(source)?)),
        EntityKind::Member => Entity::Member(Box::new(serde_json::from_value(source)?)),
        EntityKind::Role => Entity::Role(Box::new(serde_json::from_value(source)?)),
        EntityKind::Presence => Entity::Presence(Box::new(serde_json::from_value(source)?)),
    };
    Ok(entity)
}

fn snowflake_at(value: Option<&Value>) -> Option<Snowflake> {
    value.and_then(|v| serde_json::from_value(v.clone()).ok())
}

fn guild_id_of(data: &Value) -> Option<Snowflake> {
    snowflake_at(data.get("guild_id"))
}

fn derive_key(route: &EventRoute, data: &Value) -> Option<CacheKey> {
    match route.id {
        IdStrategy::Primary => snowflake_at(data.get("id")).map(CacheKey::Id),
        IdStrategy::GuildUserPair => {
            let guild_id = guild_id_of(data)?;
            let user_id = snowflake_at(data.get("user").and_then(|u| u.get("id")))?;
            Some(CacheKey::pair(guild_id, user_id))
        }
        IdStrategy::Nested(field) => {
            snowflake_at(data.get(field).and_then(|v| v.get("id"))).map(CacheKey::Id)
        }
        IdStrategy::Adjacent(field) => snowflake_at(data.get(field)).map(CacheKey::Id),
        IdStrategy::None => None,
    }
}

/// The child id half of a derived key
fn child_id_of(key: Option<CacheKey>) -> Option<Snowflake> {
    match key? {
        CacheKey::Id(id) => Some(id),
        CacheKey::Pair(_, member) => Some(member),
    }
}
