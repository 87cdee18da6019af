mod event_loop_tests;
