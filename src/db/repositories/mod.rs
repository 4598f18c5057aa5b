mod activities;
mod badges;
mod categories;
mod goals;
mod profiles;
