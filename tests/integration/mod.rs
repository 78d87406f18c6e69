pub mod lobby_lifecycle;
