//! The game facade.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use im::OrdMap;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::board::{Board, BoardId, Cell, CellRef, Direction};
use crate::containment::{ContainmentIndex, Container, ContentsSnapshot};
use crate::core::{
    EngineError, EntityId, GameClock, GameConfig, ObjectRef, Player, PlayerId, Result,
};
use crate::events::{
    DeliveryReport, Event, EventBuilder, EventDispatcher, EventKind, EventLog, EventSource,
    Listener, ListenerId, Recipients,
};
use crate::registry::EntityRegistry;

use super::command::{parse_command_json, CommandRequest};
use super::schedule::{Schedule, TimedAction};
use super::PersistenceHook;

const NOT_STARTED: u8 = 0;
const RUNNING: u8 = 1;
const OVER: u8 = 2;

/// One running game: boards, objects, players, events and timed actions.
///
/// `Game` is `Send + Sync`; share it as `Arc<Game>`. Listeners that call
/// back into the game capture an `Arc` or `Weak` handle.
///
/// Mutations publish their events synchronously. Listener failures raised
/// by those internal events are logged; use [`publish`](Self::publish) to
/// get a [`DeliveryReport`] for events you send yourself.
pub struct Game {
    config: GameConfig,
    clock: Arc<GameClock>,
    events: EventSource,
    dispatcher: EventDispatcher,
    registry: EntityRegistry,
    containment: ContainmentIndex,
    boards: FxHashMap<BoardId, Board>,
    players: Mutex<OrdMap<PlayerId, Player>>,
    schedule: Mutex<Schedule>,
    hook: Option<Arc<dyn PersistenceHook>>,
    phase: AtomicU8,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("name", &self.config.name)
            .field("time", &self.clock.now())
            .field("objects", &self.registry.len())
            .field("boards", &self.boards.len())
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl Game {
    pub(super) fn from_parts(
        config: GameConfig,
        boards: FxHashMap<BoardId, Board>,
        hook: Option<Arc<dyn PersistenceHook>>,
    ) -> Self {
        let clock = Arc::new(GameClock::new(config.initial_time));
        let registry = EntityRegistry::new(EntityId::new(config.first_entity_id));
        if let Some(max) = hook.as_ref().and_then(|h| h.max_entity_id()) {
            registry.reserve_through(max);
        }

        debug!(game = %config.name, boards = boards.len(), "created game");
        Self {
            events: EventSource::new(Arc::clone(&clock)),
            dispatcher: EventDispatcher::with_history(config.record_history),
            clock,
            registry,
            containment: ContainmentIndex::new(),
            boards,
            players: Mutex::new(OrdMap::new()),
            schedule: Mutex::new(Schedule::default()),
            hook,
            phase: AtomicU8::new(NOT_STARTED),
            config,
        }
    }

    /// The configuration the game was built with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The shared game clock.
    #[must_use]
    pub fn clock(&self) -> &Arc<GameClock> {
        &self.clock
    }

    /// Current game time.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    // =========================================================================
    // Objects
    // =========================================================================

    /// Register an object and place it in [`Container::Root`], then publish
    /// [`EventKind::EntityCreated`].
    ///
    /// For permanent objects the persistence hook may supply the id and is
    /// told about the new object before the event goes out.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateRegistration`] if the object is
    /// already registered, [`EngineError::IdInUse`] if a persisted id is
    /// taken, [`EngineError::IdSpaceExhausted`] if no fresh id is left, or
    /// [`EngineError::Persistence`] if the hook fails to assign an id.
    pub fn add_object(&self, object: ObjectRef) -> Result<EntityId> {
        let hook = self.hook_for(&object);
        let persisted = match hook {
            Some(hook) => hook.assign_id(&object).map_err(EngineError::Persistence)?,
            None => None,
        };

        let id = self.containment.insert_with(Container::Root, || match persisted {
            Some(id) => self.registry.register_with_id(Arc::clone(&object), id),
            None => self.registry.register(Arc::clone(&object)),
        })?;

        if let Some(hook) = hook {
            if let Err(err) = hook.on_created(id, &object) {
                warn!(entity = %id, error = %err, "persistence hook failed on create");
            }
        }

        debug!(entity = %id, kind = object.kind(), "added object");
        self.announce(EventKind::EntityCreated {
            entity: id,
            kind: object.kind().to_string(),
        });
        Ok(id)
    }

    /// Remove an object from the game.
    ///
    /// Objects it holds are first moved into its own container. If it is
    /// not in [`Container::Root`] it is moved there (publishing
    /// [`EventKind::EntityMoved`]), then unregistered, and
    /// [`EventKind::EntityDeleted`] is published.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotRegistered`] if the id is unknown.
    pub fn remove_object(&self, entity: EntityId) -> Result<()> {
        let holder = match self.containment.container_of(entity)? {
            Container::Object(id) if id == entity => Container::Root,
            other => other,
        };
        self.rehome_contents(Container::Object(entity), holder);

        let previous = self.containment.place(entity, Container::Root)?;
        if previous != Container::Root {
            self.announce(EventKind::EntityMoved {
                entity,
                previous,
                next: Container::Root,
            });
        }

        let (_, object) = self
            .containment
            .evict_with(entity, || self.registry.unregister(entity))?;

        // Anything placed inside it while it was on its way out.
        self.rehome_contents(Container::Object(entity), Container::Root);

        if let Some(hook) = self.hook_for(&object) {
            if let Err(err) = hook.on_removed(entity, &object) {
                warn!(entity = %entity, error = %err, "persistence hook failed on remove");
            }
        }

        debug!(entity = %entity, "removed object");
        self.announce(EventKind::EntityDeleted { entity });
        Ok(())
    }

    /// Move an object into `container`, returning where it was.
    ///
    /// Publishes [`EventKind::EntityMoved`] unless the object was already
    /// there.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotRegistered`] for an unknown object,
    /// [`EngineError::UnknownCell`] for a cell that is on no board,
    /// [`EngineError::UnknownPlayer`] for a player that has not joined, or
    /// [`EngineError::InvalidContainer`] for an unknown holder object.
    pub fn move_object(&self, entity: EntityId, container: Container) -> Result<Container> {
        match container {
            Container::Cell(cell) if self.cell_at(cell).is_none() => {
                return Err(EngineError::UnknownCell(cell));
            }
            Container::Player(player) if !self.has_player(player) => {
                return Err(EngineError::UnknownPlayer(player));
            }
            _ => {}
        }

        let previous = self.containment.place(entity, container)?;
        if previous != container {
            debug!(entity = %entity, from = %previous, to = %container, "moved object");
            self.announce(EventKind::EntityMoved {
                entity,
                previous,
                next: container,
            });
        }
        Ok(previous)
    }

    /// The board cell an object occupies: the cell holding it, or the cell
    /// holding its holder. Anything nested deeper, or not on a board,
    /// resolves to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotRegistered`] if the object is unknown.
    pub fn location_of(&self, entity: EntityId) -> Result<Option<CellRef>> {
        Ok(match self.containment.container_of(entity)? {
            Container::Cell(cell) => Some(cell),
            Container::Object(holder) => self
                .containment
                .container_of(holder)
                .ok()
                .and_then(Container::as_cell),
            Container::Root | Container::Player(_) => None,
        })
    }

    /// The container currently holding an object.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotRegistered`] if the object is unknown.
    pub fn container_of(&self, entity: EntityId) -> Result<Container> {
        self.containment.container_of(entity)
    }

    /// Snapshot of the objects directly inside `container`.
    #[must_use]
    pub fn contents_of(&self, container: Container) -> ContentsSnapshot {
        self.containment.contents_of(container)
    }

    /// Check whether `container` directly holds `entity`.
    #[must_use]
    pub fn contains(&self, container: Container, entity: EntityId) -> bool {
        self.containment.contains(container, entity)
    }

    /// Get an object by id.
    #[must_use]
    pub fn object(&self, id: EntityId) -> Option<ObjectRef> {
        self.registry.lookup(id)
    }

    /// Get the id of a registered object.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ObjectNotRegistered`] if it is not registered.
    pub fn id_of(&self, object: &ObjectRef) -> Result<EntityId> {
        self.registry.reverse_lookup(object)
    }

    /// Snapshot of every registered object, in id order.
    #[must_use]
    pub fn objects(&self) -> OrdMap<EntityId, ObjectRef> {
        self.registry.snapshot()
    }

    /// Number of registered objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.registry.len()
    }

    /// The entity registry.
    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// The containment index.
    #[must_use]
    pub fn containment(&self) -> &ContainmentIndex {
        &self.containment
    }

    fn hook_for(&self, object: &ObjectRef) -> Option<&Arc<dyn PersistenceHook>> {
        self.hook.as_ref().filter(|_| object.is_permanent())
    }

    fn rehome_contents(&self, from: Container, to: Container) {
        for child in self.containment.contents_of(from) {
            // The child may have been moved or removed concurrently.
            match self.containment.place(child, to) {
                Ok(previous) if previous != to => self.announce(EventKind::EntityMoved {
                    entity: child,
                    previous,
                    next: to,
                }),
                Ok(_) => {}
                Err(err) => debug!(entity = %child, error = %err, "skipped re-homing"),
            }
        }
    }

    // =========================================================================
    // Players
    // =========================================================================

    fn lock_players(&self) -> MutexGuard<'_, OrdMap<PlayerId, Player>> {
        self.players.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a player and publish [`EventKind::PlayerJoined`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicatePlayer`] if the id is taken.
    pub fn add_player(&self, player: Player) -> Result<()> {
        let id = player.id;
        {
            let mut players = self.lock_players();
            if players.contains_key(&id) {
                return Err(EngineError::DuplicatePlayer(id));
            }
            players.insert(id, player);
        }
        debug!(player = %id, "player joined");
        self.announce(EventKind::PlayerJoined { player: id });
        Ok(())
    }

    /// Remove a player. Objects the player held go back to
    /// [`Container::Root`], each with a move event, then
    /// [`EventKind::PlayerLeft`] is published.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownPlayer`] if the player has not joined.
    pub fn remove_player(&self, id: PlayerId) -> Result<Player> {
        let player = self
            .lock_players()
            .remove(&id)
            .ok_or(EngineError::UnknownPlayer(id))?;
        self.rehome_contents(Container::Player(id), Container::Root);
        debug!(player = %id, "player left");
        self.announce(EventKind::PlayerLeft { player: id });
        Ok(player)
    }

    /// Get a copy of a player record.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<Player> {
        self.lock_players().get(&id).cloned()
    }

    /// Update a player's property.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownPlayer`] if the player has not joined.
    pub fn set_player_property(
        &self,
        id: PlayerId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let mut players = self.lock_players();
        let player = players.get_mut(&id).ok_or(EngineError::UnknownPlayer(id))?;
        player.set_property(key, value);
        Ok(())
    }

    /// Snapshot of all players, in id order.
    #[must_use]
    pub fn players(&self) -> Vec<Player> {
        self.lock_players().values().cloned().collect()
    }

    /// Check whether a player has joined.
    #[must_use]
    pub fn has_player(&self, id: PlayerId) -> bool {
        self.lock_players().contains_key(&id)
    }

    // =========================================================================
    // Boards
    // =========================================================================

    /// Get a board.
    #[must_use]
    pub fn board(&self, id: BoardId) -> Option<&Board> {
        self.boards.get(&id)
    }

    /// All boards, in no particular order.
    pub fn boards(&self) -> impl Iterator<Item = &Board> {
        self.boards.values()
    }

    /// Get a cell by board and coordinates.
    #[must_use]
    pub fn cell(&self, board: BoardId, column: i32, row: i32) -> Option<&Cell> {
        self.boards.get(&board)?.cell(column, row)
    }

    /// Resolve a cell reference.
    #[must_use]
    pub fn cell_at(&self, cell: CellRef) -> Option<&Cell> {
        self.boards.get(&cell.board)?.cell_at(cell.location)
    }

    /// The neighbouring cell in `direction`, if the board has one.
    #[must_use]
    pub fn adjacent_cell(&self, cell: CellRef, direction: Direction) -> Option<&Cell> {
        self.boards.get(&cell.board)?.adjacent(cell.location, direction)
    }

    /// Set a cell property, returning the old value. Publishes
    /// [`EventKind::CellStateUpdated`] when the value changes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownCell`] if no board has the cell.
    pub fn set_cell_property(
        &self,
        cell: CellRef,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>> {
        let target = self.cell_at(cell).ok_or(EngineError::UnknownCell(cell))?;
        let key = key.into();
        let value = value.into();
        let old = target.set_property(key.clone(), value.clone());
        if old.as_deref() != Some(value.as_str()) {
            self.announce(EventKind::CellStateUpdated { cell, key });
        }
        Ok(old)
    }

    /// Check whether a cell directly holds an object of the given kind.
    #[must_use]
    pub fn cell_contains_kind(&self, cell: CellRef, kind: &str) -> bool {
        self.containment
            .contents_of(Container::Cell(cell))
            .iter()
            .filter_map(|id| self.registry.lookup(*id))
            .any(|object| object.kind() == kind)
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Start building an event stamped with the current game time.
    pub fn new_event(&self, kind: EventKind) -> EventBuilder<'_> {
        self.events.event(kind)
    }

    /// Publish an event to every listener.
    pub fn publish(&self, event: Event) -> DeliveryReport {
        self.dispatcher.publish(event)
    }

    /// Publish an event to the given listeners only.
    pub fn publish_to(&self, event: Event, recipients: Recipients) -> DeliveryReport {
        self.dispatcher.publish_to(event, recipients)
    }

    /// Subscribe a listener.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.dispatcher.subscribe(listener)
    }

    /// Subscribe a shared listener.
    pub fn subscribe_arc(&self, listener: Arc<dyn Listener>) -> ListenerId {
        self.dispatcher.subscribe_arc(listener)
    }

    /// Subscribe a listener and replay the event history to it first.
    pub fn subscribe_with_replay<F>(&self, listener: F) -> (ListenerId, DeliveryReport)
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.dispatcher.subscribe_with_replay(listener)
    }

    /// Unsubscribe a listener.
    pub fn unsubscribe(&self, id: ListenerId) {
        self.dispatcher.unsubscribe(id);
    }

    /// The dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn history(&self) -> im::Vector<Arc<Event>> {
        self.dispatcher.history()
    }

    /// Encode the event history for archiving.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EventLog`] if encoding fails.
    pub fn export_history(&self) -> Result<Vec<u8>> {
        EventLog::from_history(&self.dispatcher.history()).to_bytes()
    }

    /// Append an archived history without delivering it, so replaying
    /// subscribers see it. New events get ids above the archived ones.
    /// Returns the number of events restored.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EventLog`] if the bytes are not a valid log.
    pub fn import_history(&self, bytes: &[u8]) -> Result<usize> {
        let log = EventLog::from_bytes(bytes)?;
        if let Some(last) = log.last_id() {
            self.events.resume_after(last);
        }
        let count = log.len();
        self.dispatcher.restore_history(log.into_events());
        debug!(events = count, "imported event history");
        Ok(count)
    }

    fn announce(&self, kind: EventKind) {
        let event = self.events.emit(kind);
        let (id, name) = (event.id(), event.kind().name());
        let report = self.dispatcher.publish(event);
        if !report.is_ok() {
            debug!(
                event = %id,
                kind = name,
                failures = report.failures.len(),
                "listeners failed on engine event"
            );
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start the game and publish [`EventKind::GameStarted`]. Returns
    /// `false` if it was already started.
    pub fn start(&self) -> bool {
        if self
            .phase
            .compare_exchange(NOT_STARTED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        debug!(game = %self.config.name, time = self.now(), "game started");
        self.announce(EventKind::GameStarted);
        true
    }

    /// Stop the game and publish [`EventKind::GameEnded`]. Returns `false`
    /// if it was already over.
    pub fn stop(&self) -> bool {
        if self.phase.swap(OVER, Ordering::AcqRel) == OVER {
            return false;
        }
        debug!(game = %self.config.name, time = self.now(), "game ended");
        self.announce(EventKind::GameEnded);
        true
    }

    /// Check whether the game has started and not ended.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase.load(Ordering::Acquire) == RUNNING
    }

    /// Check whether the game has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase.load(Ordering::Acquire) == OVER
    }

    // =========================================================================
    // Timed actions
    // =========================================================================

    fn lock_schedule(&self) -> MutexGuard<'_, Schedule> {
        self.schedule.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Schedule `action` to run `delay` ticks from now. Returns the time it
    /// is due.
    pub fn schedule<F>(&self, delay: u64, action: F) -> u64
    where
        F: FnOnce(&Game) + Send + 'static,
    {
        let due = self.now().saturating_add(delay);
        let action: TimedAction = Box::new(action);
        self.lock_schedule().push(due, action);
        due
    }

    /// Run the earliest scheduled action: advance the clock to its time,
    /// run it, then publish [`EventKind::Timer`]. Returns `false` if
    /// nothing is scheduled.
    pub fn run_next(&self) -> bool {
        let next = self.lock_schedule().pop_due(u64::MAX);
        match next {
            Some(scheduled) => {
                self.clock.advance_to(scheduled.time);
                (scheduled.action)(self);
                self.announce(EventKind::Timer);
                true
            }
            None => false,
        }
    }

    /// Run every action due at or before `time`, in order, then advance the
    /// clock to `time`. Returns how many ran.
    pub fn run_until(&self, time: u64) -> usize {
        let mut ran = 0;
        loop {
            let next = self.lock_schedule().pop_due(time);
            let Some(scheduled) = next else { break };
            self.clock.advance_to(scheduled.time);
            (scheduled.action)(self);
            self.announce(EventKind::Timer);
            ran += 1;
        }
        self.clock.advance_to(time);
        ran
    }

    /// Due time of the earliest scheduled action.
    #[must_use]
    pub fn next_action_time(&self) -> Option<u64> {
        self.lock_schedule().next_time()
    }

    /// Number of scheduled actions.
    #[must_use]
    pub fn scheduled_len(&self) -> usize {
        self.lock_schedule().len()
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Publish a player command as [`EventKind::Command`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownPlayer`] if the player has not joined.
    pub fn issue_command(&self, player: PlayerId, request: CommandRequest) -> Result<DeliveryReport> {
        if !self.has_player(player) {
            return Err(EngineError::UnknownPlayer(player));
        }
        debug!(player = %player, command = %request.command, "command issued");
        let event = self.events.emit(EventKind::Command {
            player,
            command: request.command,
            parameter: request.parameter,
        });
        Ok(self.dispatcher.publish(event))
    }

    /// Decode a JSON command and publish it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CommandParse`] for malformed input and fails
    /// like [`issue_command`](Self::issue_command).
    pub fn issue_command_json(&self, player: PlayerId, json: &str) -> Result<DeliveryReport> {
        let request = parse_command_json(json)?;
        self.issue_command(player, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardBuilder, Location};
    use crate::core::GameObject;
    use crate::game::GameBuilder;

    #[derive(Debug)]
    struct Thing(&'static str);

    impl GameObject for Thing {
        fn kind(&self) -> &str {
            self.0
        }
    }

    fn game() -> Game {
        GameBuilder::new(GameConfig::new("test"))
            .with_board(BoardBuilder::new(BoardId::new(0), "main").fill(5, 5, "floor").build())
            .build()
            .unwrap()
    }

    fn cell(column: i32, row: i32) -> CellRef {
        CellRef::new(BoardId::new(0), Location::new(column, row))
    }

    #[test]
    fn test_remove_rehomes_contents_into_holder() {
        let game = game();
        let chest = game.add_object(Arc::new(Thing("chest"))).unwrap();
        let coin = game.add_object(Arc::new(Thing("coin"))).unwrap();
        game.move_object(chest, Container::Cell(cell(1, 1))).unwrap();
        game.move_object(coin, Container::Object(chest)).unwrap();

        game.remove_object(chest).unwrap();

        assert_eq!(game.container_of(coin).unwrap(), Container::Cell(cell(1, 1)));
        assert!(game.contents_of(Container::Object(chest)).is_empty());
        assert!(game.containment().check_consistency());
    }

    #[test]
    fn test_self_contained_object_can_be_removed() {
        let game = game();
        let knot = game.add_object(Arc::new(Thing("knot"))).unwrap();
        game.move_object(knot, Container::Object(knot)).unwrap();

        game.remove_object(knot).unwrap();
        assert!(game.object(knot).is_none());
        assert!(game.containment().is_empty());
    }

    #[test]
    fn test_unknown_targets_rejected() {
        let game = game();
        let id = game.add_object(Arc::new(Thing("rock"))).unwrap();

        assert!(matches!(
            game.move_object(id, Container::Cell(cell(9, 9))),
            Err(EngineError::UnknownCell(_))
        ));
        assert!(matches!(
            game.move_object(id, Container::Player(PlayerId::new(3))),
            Err(EngineError::UnknownPlayer(_))
        ));
        assert!(matches!(
            game.move_object(id, Container::Object(EntityId(99))),
            Err(EngineError::InvalidContainer(_))
        ));
        assert_eq!(game.container_of(id).unwrap(), Container::Root);
    }

    #[test]
    fn test_cell_property_event_only_on_change() {
        let game = game();
        game.set_cell_property(cell(0, 0), "lit", "yes").unwrap();
        game.set_cell_property(cell(0, 0), "lit", "yes").unwrap();

        let updates = game
            .history()
            .iter()
            .filter(|e| matches!(e.kind(), EventKind::CellStateUpdated { .. }))
            .count();
        assert_eq!(updates, 1);
        assert!(matches!(
            game.set_cell_property(cell(7, 7), "lit", "no"),
            Err(EngineError::UnknownCell(_))
        ));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_engine_event_failures_name_the_event() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let game = game();
        game.subscribe(|_| Err(anyhow::anyhow!("listener down")));
        let coin = tracing::subscriber::with_default(subscriber, || {
            game.add_object(Arc::new(Thing("coin"))).unwrap()
        });

        let created = game
            .history()
            .iter()
            .find(|e| matches!(e.kind(), EventKind::EntityCreated { entity, .. } if *entity == coin))
            .map(|e| e.id())
            .unwrap();
        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let summary = output
            .lines()
            .find(|line| line.contains("listeners failed on engine event"))
            .unwrap();
        assert!(summary.contains(&format!("event={created}")), "{summary}");
        assert!(summary.contains("failures=1"), "{summary}");
    }

    #[test]
    fn test_lifecycle_transitions() {
        let game = game();
        assert!(game.start());
        assert!(!game.start());
        assert!(game.is_running());
        assert!(game.stop());
        assert!(!game.stop());
        assert!(game.is_over());
        assert!(!game.is_running());
    }
}
